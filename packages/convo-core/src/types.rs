//! Core data types for conversations, submissions and shared state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a message. Placeholder ids are UUID strings.
pub type MessageId = String;

/// Sender name used for every user-authored message.
pub const USER_SENDER: &str = "User";

/// Model id that marks an explicitly custom model.
pub const CUSTOM_MODEL: &str = "chatgptCustom";

/// Parent id used by the server for messages at the top of a conversation.
pub const ROOT_PARENT_ID: &str = "00000000-0000-0000-0000-000000000000";

/// A chat message and, once the tree is built, its replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_created_by_user: bool,
    /// Set by the submission pipeline when the request failed
    #[serde(default)]
    pub error: bool,
    /// Set on the placeholder response while it is being streamed
    #[serde(default)]
    pub submitting: bool,
    /// Marks the active leaf of a multi-branch history
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Message>,
}

impl Message {
    /// Create a user-authored message.
    pub fn user(id: &str, parent: Option<&str>, text: &str) -> Self {
        Self {
            message_id: id.to_string(),
            parent_message_id: parent.map(str::to_string),
            sender: USER_SENDER.to_string(),
            text: text.to_string(),
            is_created_by_user: true,
            ..Default::default()
        }
    }

    /// Create a model response.
    pub fn assistant(id: &str, parent: Option<&str>, sender: &str, text: &str) -> Self {
        Self {
            message_id: id.to_string(),
            parent_message_id: parent.map(str::to_string),
            sender: sender.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// A message with no children is the leaf of the displayed path.
    pub fn is_last(&self) -> bool {
        self.children.is_empty()
    }

    /// Copy of this message without its children, as stored in the flat list.
    pub fn flat(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// Conversation-level state shared by every rendered message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Deepest rendered message; new prompts are parented here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
}

/// Partial update merged into [`ConversationState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
}

impl ConversationPatch {
    pub fn parent(message_id: &str) -> Self {
        Self {
            parent_message_id: Some(message_id.to_string()),
            ..Default::default()
        }
    }
}

impl ConversationState {
    /// Merge the fields present in `patch`.
    pub fn apply(&mut self, patch: ConversationPatch) {
        if let Some(conversation_id) = patch.conversation_id {
            self.conversation_id = Some(conversation_id);
        }
        if let Some(parent) = patch.parent_message_id {
            self.parent_message_id = Some(parent);
        }
    }
}

/// Submission state: the selected model and whether a request is in flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitState {
    pub is_submitting: bool,
    pub model: String,
    /// Display label of a custom model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
    /// Last published submission, owned by the store until the pipeline takes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
}

impl Default for SubmitState {
    fn default() -> Self {
        Self {
            is_submitting: false,
            model: "chatgpt".to_string(),
            custom_label: None,
            prompt_prefix: None,
            submission: None,
        }
    }
}

/// The current user message plus the model parameters it is sent with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMessage {
    #[serde(flatten)]
    pub message: Message,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
}

/// Payload handed to the submission pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub is_custom_model: bool,
    pub message: SubmissionMessage,
    /// Flat message list as it was before the edit
    pub messages: Vec<Message>,
    pub current_msg: Message,
    pub initial_response: Message,
    pub sender: String,
    pub created_at: DateTime<Utc>,
}

/// Generic response wrapper for CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_last() {
        let mut parent = Message::user("a", None, "hi");
        assert!(parent.is_last());

        parent.children.push(Message::assistant("b", Some("a"), "chatgpt", "hello"));
        assert!(!parent.is_last());
        assert!(parent.flat().is_last());
    }

    #[test]
    fn test_message_camel_case_json() {
        let json = r#"{
            "messageId": "m1",
            "parentMessageId": "00000000-0000-0000-0000-000000000000",
            "sender": "User",
            "text": "Hi",
            "isCreatedByUser": true
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.message_id, "m1");
        assert_eq!(message.parent_message_id.as_deref(), Some(ROOT_PARENT_ID));
        assert!(message.is_created_by_user);
        assert!(!message.error);
        assert!(message.children.is_empty());

        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["isCreatedByUser"], true);
        assert!(back.get("children").is_none());
    }

    #[test]
    fn test_conversation_patch_merges() {
        let mut state = ConversationState {
            error: true,
            conversation_id: Some("c1".to_string()),
            parent_message_id: None,
        };
        state.apply(ConversationPatch::parent("m9"));

        assert_eq!(state.conversation_id.as_deref(), Some("c1"));
        assert_eq!(state.parent_message_id.as_deref(), Some("m9"));
        assert!(state.error);
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("done".to_string());
        assert!(response.ok);
        assert_eq!(response.data.as_deref(), Some("done"));

        let err_response: ApiResponse<String> = ApiResponse::err("boom");
        assert!(!err_response.ok);
        assert_eq!(err_response.error.as_deref(), Some("boom"));
    }
}
