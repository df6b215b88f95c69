//! Editable draft of a message in edit mode.
//!
//! A multi-line text input with "Save & Submit" and "Cancel" buttons.

use gpui::prelude::*;
use gpui::*;
use crate::keyboard::{CancelEdit, SaveEdit, EDIT_CONTEXT};
use crate::theme::Theme;

/// Events emitted by the edit input
#[derive(Clone, Debug, PartialEq)]
pub enum EditEvent {
    Save(String),
    Cancel,
}

/// Edit input component
pub struct EditInput {
    focus_handle: FocusHandle,
    message_id: String,
    text: String,
    cursor_position: usize,
    save_enabled: bool,
}

impl EditInput {
    pub fn new(message_id: &str, text: &str, cx: &mut Context<Self>) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            message_id: message_id.to_string(),
            text: text.to_string(),
            cursor_position: text.len(),
            save_enabled: true,
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn set_save_enabled(&mut self, enabled: bool, cx: &mut Context<Self>) {
        if self.save_enabled != enabled {
            self.save_enabled = enabled;
            cx.notify();
        }
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.focus_handle.focus(window, cx);
    }

    fn save(&mut self, cx: &mut Context<Self>) {
        if self.save_enabled {
            cx.emit(EditEvent::Save(self.text.clone()));
        }
    }

    fn insert_text(&mut self, text: &str, cx: &mut Context<Self>) {
        self.text.insert_str(self.cursor_position, text);
        self.cursor_position += text.len();
        cx.notify();
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor_position]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor_position..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor_position + i)
            .unwrap_or(self.text.len())
    }

    fn handle_key_down(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) {
        let modifiers = event.keystroke.modifiers;
        let key = event.keystroke.key.as_str();

        match key {
            // Bound to actions
            "escape" => {}
            "enter" if modifiers.control || modifiers.platform => {}
            "enter" => self.insert_text("\n", cx),
            "backspace" => {
                if self.cursor_position > 0 {
                    let prev = self.prev_boundary();
                    self.text.remove(prev);
                    self.cursor_position = prev;
                    cx.notify();
                }
            }
            "delete" => {
                if self.cursor_position < self.text.len() {
                    self.text.remove(self.cursor_position);
                    cx.notify();
                }
            }
            "left" => {
                self.cursor_position = self.prev_boundary();
                cx.notify();
            }
            "right" => {
                self.cursor_position = self.next_boundary();
                cx.notify();
            }
            "home" => {
                self.cursor_position = 0;
                cx.notify();
            }
            "end" => {
                self.cursor_position = self.text.len();
                cx.notify();
            }
            _ => {
                if modifiers.control || modifiers.alt || modifiers.platform {
                    return;
                }
                if let Some(key_char) = &event.keystroke.key_char {
                    self.insert_text(key_char, cx);
                } else if key == "space" {
                    self.insert_text(" ", cx);
                }
            }
        }
    }

    fn render_text_with_cursor(&self, is_focused: bool, theme: &Theme) -> impl IntoElement {
        let (before, after) = self.text.split_at(self.cursor_position);

        div()
            .flex()
            .flex_wrap()
            .child(div().child(before.to_string()))
            .when(is_focused, |el| {
                el.child(div().w(px(2.0)).h(px(18.0)).bg(theme.primary))
            })
            .child(div().child(after.to_string()))
    }

    fn render_button(
        &self,
        id: &'static str,
        label: &'static str,
        primary: bool,
        enabled: bool,
        theme: &Theme,
    ) -> Stateful<Div> {
        let bg = if primary && enabled {
            theme.primary
        } else {
            theme.background_element
        };
        let fg = if primary && enabled {
            theme.background
        } else if enabled {
            theme.text
        } else {
            theme.text_muted
        };

        div()
            .id(id)
            .px(px(12.0))
            .py(px(6.0))
            .rounded(px(6.0))
            .bg(bg)
            .text_sm()
            .text_color(fg)
            .when(enabled, |el| el.cursor_pointer().hover(|s| s.opacity(0.9)))
            .child(label)
    }
}

impl EventEmitter<EditEvent> for EditInput {}

impl Render for EditInput {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();
        let is_focused = self.focus_handle.is_focused(window);
        let border_color = if is_focused { theme.primary } else { theme.border };
        let save_enabled = self.save_enabled;

        div()
            .flex()
            .flex_col()
            .gap(px(8.0))
            .child(
                div()
                    .id("edit-input")
                    .key_context(EDIT_CONTEXT)
                    .track_focus(&self.focus_handle)
                    .min_h(px(44.0))
                    .px(px(14.0))
                    .py(px(10.0))
                    .rounded(px(8.0))
                    .bg(theme.background_element)
                    .border_1()
                    .border_color(border_color)
                    .cursor_text()
                    .on_key_down(cx.listener(|this, event, _window, cx| {
                        this.handle_key_down(event, cx);
                    }))
                    .on_action(cx.listener(|this, _: &SaveEdit, _window, cx| {
                        this.save(cx);
                    }))
                    .on_action(cx.listener(|_this, _: &CancelEdit, _window, cx| {
                        cx.emit(EditEvent::Cancel);
                    }))
                    .child(self.render_text_with_cursor(is_focused, theme)),
            )
            .child(
                div()
                    .flex()
                    .justify_center()
                    .gap(px(8.0))
                    .child(
                        self.render_button("edit-save", "Save & Submit", true, save_enabled, theme)
                            .when(save_enabled, |el| {
                                el.on_click(cx.listener(|this, _event, _window, cx| {
                                    this.save(cx);
                                }))
                            }),
                    )
                    .child(
                        self.render_button("edit-cancel", "Cancel", false, true, theme).on_click(
                            cx.listener(|_this, _event, _window, cx| {
                                cx.emit(EditEvent::Cancel);
                            }),
                        ),
                    ),
            )
    }
}
