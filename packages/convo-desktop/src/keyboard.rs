//! Keyboard bindings for Convo Desktop

use gpui::*;

actions!(
    convo,
    [
        CancelEdit,
        SaveEdit,
        CycleModel,
        ToggleTheme,
    ]
);

/// Key context of the conversation view
pub const CONVERSATION_CONTEXT: &str = "Conversation";

/// Key context of the edit input
pub const EDIT_CONTEXT: &str = "EditInput";

/// Initialize keyboard bindings
pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("escape", CancelEdit, Some(EDIT_CONTEXT)),
        KeyBinding::new("ctrl-enter", SaveEdit, Some(EDIT_CONTEXT)),
        KeyBinding::new("cmd-enter", SaveEdit, Some(EDIT_CONTEXT)),
        KeyBinding::new("ctrl-m", CycleModel, Some(CONVERSATION_CONTEXT)),
        KeyBinding::new("ctrl-shift-t", ToggleTheme, None),
    ]);

    tracing::debug!("Keyboard bindings initialized");
}
