//! Hover action bar shown on user messages.

use serde::{Deserialize, Serialize};

/// The edit button revealed on hover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverButtons {
    pub model: String,
    pub visible: bool,
}

impl HoverButtons {
    /// Only user messages that are neither failed nor being edited can be edited.
    pub fn for_message(model: &str, error: bool, is_created_by_user: bool, editing: bool) -> Self {
        Self {
            model: model.to_string(),
            visible: !error && is_created_by_user && !editing,
        }
    }
}
