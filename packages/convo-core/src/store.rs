//! Shared conversation state behind a selector/action interface.
//!
//! Components read through the selector methods and write only through
//! [`Store::dispatch`]. Actions are applied synchronously in dispatch order.

use crate::config::{ConvoConfig, ModelRegistry};
use crate::types::{ConversationPatch, ConversationState, Message, SubmitState, Submission};
use serde::{Deserialize, Serialize};

/// State changes a component may request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Action {
    SetError(bool),
    SetMessages(Vec<Message>),
    SetSubmitState(bool),
    SetSubmission(Box<Submission>),
    SetText(String),
    SetConversation(ConversationPatch),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetError(_) => "setError",
            Action::SetMessages(_) => "setMessages",
            Action::SetSubmitState(_) => "setSubmitState",
            Action::SetSubmission(_) => "setSubmission",
            Action::SetText(_) => "setText",
            Action::SetConversation(_) => "setConversation",
        }
    }
}

/// Read and write access to shared state.
pub trait Store {
    fn submit_state(&self) -> &SubmitState;
    fn conversation(&self) -> &ConversationState;
    fn models(&self) -> &ModelRegistry;
    fn text(&self) -> &str;
    fn dispatch(&mut self, action: Action);

    fn set_error(&mut self, error: bool) {
        self.dispatch(Action::SetError(error));
    }

    fn set_messages(&mut self, messages: Vec<Message>) {
        self.dispatch(Action::SetMessages(messages));
    }

    fn set_submit_state(&mut self, is_submitting: bool) {
        self.dispatch(Action::SetSubmitState(is_submitting));
    }

    fn set_submission(&mut self, submission: Submission) {
        self.dispatch(Action::SetSubmission(Box::new(submission)));
    }

    fn set_text(&mut self, text: String) {
        self.dispatch(Action::SetText(text));
    }

    fn set_conversation(&mut self, patch: ConversationPatch) {
        self.dispatch(Action::SetConversation(patch));
    }
}

/// In-memory store applying actions with a plain reducer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    submit: SubmitState,
    conversation: ConversationState,
    messages: Vec<Message>,
    models: ModelRegistry,
    text: String,
}

impl MemoryStore {
    /// Create a store seeded from configuration.
    pub fn new(config: &ConvoConfig) -> Self {
        Self {
            submit: SubmitState {
                model: config.default_model.clone(),
                ..Default::default()
            },
            models: config.registry(),
            ..Default::default()
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Flat message list
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Select the model used for the next submission.
    pub fn select_model(
        &mut self,
        model: &str,
        custom_label: Option<String>,
        prompt_prefix: Option<String>,
    ) {
        self.submit.model = model.to_string();
        self.submit.custom_label = custom_label;
        self.submit.prompt_prefix = prompt_prefix;
    }

    /// Hand the pending submission to a pipeline.
    pub fn take_submission(&mut self) -> Option<Submission> {
        self.submit.submission.take()
    }

    /// Append streamed text to a message in the flat list.
    pub fn append_text(&mut self, message_id: &str, chunk: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.message_id == message_id) {
            Some(message) => {
                message.text.push_str(chunk);
                true
            }
            None => false,
        }
    }

    /// Mark a streamed message finished, optionally as failed.
    pub fn finish_message(&mut self, message_id: &str, error: bool) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.message_id == message_id) {
            message.submitting = false;
            message.error = error;
        }
        self.submit.is_submitting = false;
        if error {
            self.conversation.error = true;
        }
    }

    fn reduce(&mut self, action: Action) {
        match action {
            Action::SetError(error) => self.conversation.error = error,
            Action::SetMessages(messages) => self.messages = messages,
            Action::SetSubmitState(is_submitting) => self.submit.is_submitting = is_submitting,
            Action::SetSubmission(submission) => self.submit.submission = Some(*submission),
            Action::SetText(text) => self.text = text,
            Action::SetConversation(patch) => self.conversation.apply(patch),
        }
    }
}

impl Store for MemoryStore {
    fn submit_state(&self) -> &SubmitState {
        &self.submit
    }

    fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    fn models(&self) -> &ModelRegistry {
        &self.models
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn dispatch(&mut self, action: Action) {
        tracing::debug!("dispatch {}", action.name());
        self.reduce(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_config_defaults() {
        let store = MemoryStore::new(&ConvoConfig::default());
        assert_eq!(store.submit_state().model, "chatgpt");
        assert!(!store.submit_state().is_submitting);
        assert!(store.models().contains("bingai"));
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_setters_reduce() {
        let mut store = MemoryStore::default();
        store.set_error(true);
        store.set_submit_state(true);
        store.set_text("draft".to_string());
        store.set_messages(vec![Message::user("a", None, "hi")]);
        store.set_conversation(ConversationPatch::parent("a"));

        assert!(store.conversation().error);
        assert!(store.submit_state().is_submitting);
        assert_eq!(store.text(), "draft");
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_streaming_helpers() {
        let mut response = Message::assistant("r", Some("a"), "chatgpt", "");
        response.submitting = true;
        let mut store = MemoryStore::default().with_messages(vec![response]);
        store.set_submit_state(true);

        assert!(store.append_text("r", "Hel"));
        assert!(store.append_text("r", "lo"));
        assert!(!store.append_text("missing", "x"));
        store.finish_message("r", false);

        let message = &store.messages()[0];
        assert_eq!(message.text, "Hello");
        assert!(!message.submitting);
        assert!(!store.submit_state().is_submitting);
        assert!(!store.conversation().error);
    }

    #[test]
    fn test_failed_stream_flags_error() {
        let mut store = MemoryStore::default()
            .with_messages(vec![Message::assistant("r", None, "chatgpt", "timeout")]);
        store.finish_message("r", true);

        assert!(store.messages()[0].error);
        assert!(store.conversation().error);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::SetText(String::new()).name(), "setText");
        assert_eq!(Action::SetSubmitState(true).name(), "setSubmitState");
    }
}
