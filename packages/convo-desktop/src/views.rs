//! View modules for Convo Desktop

pub mod conversation;
