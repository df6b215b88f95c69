//! Sender icons.

use crate::config::ModelRegistry;
use serde::{Deserialize, Serialize};

/// What a message shows next to its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Icon {
    /// Plain label, e.g. a custom model's name
    Text(String),
    Element(IconElement),
}

/// Icons drawn by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IconElement {
    UserAvatar,
    Badge {
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        error: bool,
    },
}

impl Icon {
    /// Text icons with non-ASCII characters are shown as a right-to-left
    /// scrollable label.
    pub fn scrolls_rtl(&self) -> bool {
        match self {
            Icon::Text(text) => !text.is_ascii(),
            Icon::Element(_) => false,
        }
    }
}

/// Inputs of icon resolution.
#[derive(Debug, Clone, Copy)]
pub struct IconRequest<'a> {
    pub sender: &'a str,
    pub is_created_by_user: bool,
    pub model: &'a str,
    pub custom_label: Option<&'a str>,
    pub prompt_prefix: Option<&'a str>,
    pub error: bool,
}

/// Maps a message and the selected model to an icon.
pub trait IconResolver {
    fn resolve(&self, request: &IconRequest<'_>) -> Icon;
}

/// Resolver backed by the known-models registry.
#[derive(Debug, Clone, Default)]
pub struct DefaultIconResolver {
    registry: ModelRegistry,
    custom_model: String,
}

impl DefaultIconResolver {
    pub fn new(registry: ModelRegistry, custom_model: &str) -> Self {
        Self {
            registry,
            custom_model: custom_model.to_string(),
        }
    }
}

impl IconResolver for DefaultIconResolver {
    fn resolve(&self, request: &IconRequest<'_>) -> Icon {
        if request.is_created_by_user {
            return Icon::Element(IconElement::UserAvatar);
        }

        if request.model == self.custom_model {
            let label = request
                .custom_label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or("Custom");
            return Icon::Text(label.to_string());
        }

        let color = self
            .registry
            .get(request.model)
            .and_then(|entry| entry.color.clone());
        Icon::Element(IconElement::Badge {
            model: request.model.to_string(),
            color,
            error: request.error,
        })
    }
}
