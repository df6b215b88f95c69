//! Application state shared by the views and the echo pipeline
//!
//! The conversation store lives in a GPUI global so that every view and the
//! pipeline task read and write the same message list.

use convo_core::{ConvoConfig, MemoryStore, Message};
use gpui::*;

/// Shared conversation state
pub struct ConvoState {
    pub store: MemoryStore,
    pub config: ConvoConfig,
}

impl ConvoState {
    pub fn new(config: &ConvoConfig, messages: Vec<Message>) -> Self {
        let mut store = MemoryStore::new(config).with_messages(messages);
        let (label, prefix) = config.model_params(&config.default_model);
        store.select_model(&config.default_model, label, prefix);
        Self {
            store,
            config: config.clone(),
        }
    }

    /// Model ids offered in the model picker, in configuration order.
    pub fn model_ids(&self) -> Vec<String> {
        self.config.models.iter().map(|m| m.id.clone()).collect()
    }
}

impl Global for ConvoState {}

/// Initialize the shared state
pub fn init(config: &ConvoConfig, messages: Vec<Message>, cx: &mut App) {
    cx.set_global(ConvoState::new(config, messages));
    tracing::debug!("Conversation state initialized with model {}", config.default_model);
}

/// Conversation shown when no file is given on the command line.
pub fn demo_conversation() -> Vec<Message> {
    vec![
        Message::user("demo-u1", None, "What is a borrow checker?"),
        Message::assistant(
            "demo-a1",
            Some("demo-u1"),
            "chatgpt",
            "It is the part of the compiler that checks references never outlive \
             the data they point to.",
        ),
        Message::assistant(
            "demo-a2",
            Some("demo-u1"),
            "chatgpt",
            "The borrow checker enforces ownership rules at compile time:\n\n\
             ```rust\nlet s = String::from(\"hi\");\nlet r = &s;\nprintln!(\"{}\", r);\n```",
        ),
        Message::user("demo-u2", Some("demo-a2"), "Show me a case it rejects."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_core::{build_tree, newest_path, Store};

    #[test]
    fn test_demo_conversation_has_branches() {
        let roots = build_tree(&demo_conversation());
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children.len(), 2);

        let path: Vec<&str> = newest_path(&roots)
            .iter()
            .map(|m| m.message_id.as_str())
            .collect();
        assert_eq!(path, vec!["demo-u1", "demo-a2", "demo-u2"]);
    }

    #[test]
    fn test_state_uses_configured_models() {
        let config = ConvoConfig::default();
        let state = ConvoState::new(&config, demo_conversation());
        assert_eq!(state.model_ids().len(), config.models.len());
        assert!(state.store.models().contains("chatgpt"));
        assert_eq!(state.store.messages().len(), 4);
    }
}
