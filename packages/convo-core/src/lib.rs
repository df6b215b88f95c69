//! Convo Core - headless view-model for branching chat conversations.
//!
//! This crate renders one chat message at a time and walks the conversation
//! tree through its children:
//!
//! - **Message rendering**: error, edit and normal views with a streaming cursor
//! - **Edit and resubmit**: optimistic message records dispatched as a new submission
//! - **Sibling navigation**: switching between alternate responses of one parent
//! - **Store**: selector/action access to shared conversation state
//!
//! # Example
//!
//! ```rust,no_run
//! use convo_core::{build_tree, MemoryStore, NoScroll, RenderDeps, Thread};
//!
//! let mut store = MemoryStore::default();
//! let messages = store.messages().to_vec();
//! let roots = build_tree(&messages);
//!
//! let mut thread = Thread::new();
//! let deps = RenderDeps::default();
//! if let Some(view) = thread.render(&roots, &messages, &mut store, &mut NoScroll, &deps) {
//!     println!("{}", serde_json::to_string_pretty(&view).unwrap());
//! }
//! ```

pub mod config;
pub mod hover;
pub mod icon;
pub mod ids;
pub mod message;
pub mod sibling;
pub mod store;
pub mod text;
pub mod thread;
pub mod tree;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{ConvoConfig, ModelEntry, ModelRegistry};
pub use hover::HoverButtons;
pub use icon::{DefaultIconResolver, Icon, IconElement, IconRequest, IconResolver};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use message::{
    cancel_edit, MessageComponent, MessageState, NoScroll, RenderDeps, RenderMode, ScrollHost,
};
pub use sibling::SiblingSwitch;
pub use store::{Action, MemoryStore, Store};
pub use text::{Cursor, MarkdownWrapper, TextBlock, TextWrapper, WrappedText};
pub use thread::Thread;
pub use tree::{build_tree, find_with_siblings, load_messages, newest_path};
pub use types::{
    ApiResponse, ConversationPatch, ConversationState, Message, MessageId, SubmitState, Submission,
    SubmissionMessage,
};
pub use view::{error_text, MessageBody, MessageView, RowStyle, ERROR_PREFIX};

/// Error types for convo-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Message not found: {0}")]
    MessageNotFound(String),
}

/// Result type for convo-core operations.
pub type Result<T> = std::result::Result<T, Error>;
