//! Reusable UI components for Convo Desktop

pub mod edit_input;
