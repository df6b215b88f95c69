//! Rendered view tree handed to the UI layer.

use crate::hover::HoverButtons;
use crate::icon::Icon;
use crate::sibling::SiblingSwitch;
use crate::text::WrappedText;
use crate::types::MessageId;
use serde::{Deserialize, Serialize};

/// Fixed first line of the error view.
pub const ERROR_PREFIX: &str = "An error occurred. Please try again in a few moments.";

/// Full error text shown for a failed message.
pub fn error_text(detail: &str) -> String {
    format!("{}\n\nError message: {}", ERROR_PREFIX, detail)
}

/// Row background, by author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowStyle {
    User,
    Assistant,
}

/// Body of a message row. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum MessageBody {
    Error {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Edit {
        draft: String,
        save_enabled: bool,
    },
    /// User text, shown verbatim
    Plain {
        text: String,
    },
    /// Model text after wrapping
    Wrapped(WrappedText),
}

impl MessageBody {
    pub fn is_error(&self) -> bool {
        matches!(self, MessageBody::Error { .. })
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, MessageBody::Edit { .. })
    }

    pub fn has_cursor(&self) -> bool {
        matches!(self, MessageBody::Wrapped(w) if w.cursor.is_some())
    }
}

/// One rendered message plus the rendered selected child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub message_id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
    pub row: RowStyle,
    pub icon: Icon,
    pub icon_scrolls_rtl: bool,
    pub body: MessageBody,
    pub hover_buttons: HoverButtons,
    pub sibling_switch: SiblingSwitch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<MessageView>>,
}

impl MessageView {
    /// Rendered rows from this one down to the displayed leaf.
    pub fn path(&self) -> Vec<&MessageView> {
        let mut path = vec![self];
        let mut current = self;
        while let Some(child) = current.child.as_deref() {
            path.push(child);
            current = child;
        }
        path
    }
}
