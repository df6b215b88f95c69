//! Conversation view
//!
//! Draws the selected path of the conversation tree, one row per message,
//! and routes clicks, wheel and key events back into the thread.

use gpui::prelude::*;
use gpui::*;
use convo_core::{
    build_tree, ConvoConfig, Icon, IconElement, MessageBody, MessageView, RenderDeps, RowStyle,
    ScrollHost, Store, TextBlock, Thread, UuidIds, WrappedText,
};
use crate::components::edit_input::{EditEvent, EditInput};
use crate::keyboard::{CycleModel, ToggleTheme, CONVERSATION_CONTEXT};
use crate::state::ConvoState;
use crate::theme::{toggle_theme_mode, Theme};

/// Scrolls the message list through its GPUI scroll handle.
struct ScrollHandleHost<'a>(&'a ScrollHandle);

impl ScrollHost for ScrollHandleHost<'_> {
    fn scroll_to_bottom(&mut self) {
        self.0.scroll_to_bottom();
    }
}

fn element_id(prefix: &str, message_id: &str) -> ElementId {
    ElementId::Name(format!("{}-{}", prefix, message_id).into())
}

/// Conversation view
pub struct ConversationView {
    focus_handle: FocusHandle,
    scroll_handle: ScrollHandle,
    thread: Thread,
    deps: RenderDeps,
    edit_input: Option<Entity<EditInput>>,
    _edit_subscription: Option<Subscription>,
}

impl ConversationView {
    pub fn new(config: &ConvoConfig, cx: &mut Context<Self>) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            scroll_handle: ScrollHandle::new(),
            thread: Thread::new(),
            deps: RenderDeps::from_config(config),
            edit_input: None,
            _edit_subscription: None,
        }
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.focus_handle.focus(window, cx);
    }

    /// Run the view-model over the current store contents.
    fn render_thread(&mut self, cx: &mut Context<Self>) -> Option<MessageView> {
        let state = cx.global_mut::<ConvoState>();
        let messages = state.store.messages().to_vec();
        let roots = build_tree(&messages);

        let mut host = ScrollHandleHost(&self.scroll_handle);
        self.thread
            .render(&roots, &messages, &mut state.store, &mut host, &self.deps)
    }

    /// Keep the edit input in step with the row shown in edit mode.
    fn sync_edit_input(
        &mut self,
        view: Option<&MessageView>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let editing = view.and_then(|view| {
            view.path()
                .into_iter()
                .find(|row| row.body.is_edit())
                .map(|row| (row.message_id.clone(), row.body.clone()))
        });

        let Some((message_id, MessageBody::Edit { draft, save_enabled })) = editing else {
            if self.close_edit_input() {
                self.focus_handle.focus(window, cx);
            }
            return;
        };

        let stale = self
            .edit_input
            .as_ref()
            .map(|input| input.read(cx).message_id() != message_id)
            .unwrap_or(true);
        if stale {
            let input = cx.new(|cx| EditInput::new(&message_id, &draft, cx));
            let subscription = cx.subscribe(&input, |this, _input, event: &EditEvent, cx| {
                match event {
                    EditEvent::Save(text) => this.save_edit(text, cx),
                    EditEvent::Cancel => this.cancel_edit(cx),
                }
            });
            input.update(cx, |input, cx| input.focus(window, cx));
            self.edit_input = Some(input);
            self._edit_subscription = Some(subscription);
        }

        if let Some(input) = &self.edit_input {
            input.update(cx, |input, cx| input.set_save_enabled(save_enabled, cx));
        }
    }

    fn close_edit_input(&mut self) -> bool {
        self._edit_subscription = None;
        self.edit_input.take().is_some()
    }

    fn begin_edit(&mut self, message_id: &str, cx: &mut Context<Self>) {
        self.thread.enter_edit(message_id);
        cx.notify();
    }

    fn cancel_edit(&mut self, cx: &mut Context<Self>) {
        self.thread.cancel_edit();
        self.close_edit_input();
        cx.notify();
    }

    fn save_edit(&mut self, text: &str, cx: &mut Context<Self>) {
        let Some(message_id) = self.thread.current_edit().map(str::to_string) else {
            return;
        };

        let state = cx.global_mut::<ConvoState>();
        let messages = state.store.messages().to_vec();
        let roots = build_tree(&messages);
        match self.thread.save(
            &message_id,
            text,
            &roots,
            &messages,
            &mut state.store,
            &self.deps,
            &mut UuidIds,
        ) {
            Ok(true) => tracing::debug!("Resubmitted edit of {}", message_id),
            Ok(false) => tracing::debug!("Save ignored for {}", message_id),
            Err(e) => tracing::warn!("Failed to save edit: {}", e),
        }
        cx.notify();
    }

    fn select_sibling(
        &mut self,
        parent: Option<&str>,
        sibling_idx: usize,
        sibling_count: usize,
        cx: &mut Context<Self>,
    ) {
        self.thread.select_sibling(parent, sibling_idx, sibling_count);
        cx.notify();
    }

    fn cycle_model(&mut self, cx: &mut Context<Self>) {
        let state = cx.global_mut::<ConvoState>();
        let models = state.model_ids();
        if models.is_empty() {
            return;
        }

        let current = state.store.submit_state().model.clone();
        let next = models
            .iter()
            .position(|m| *m == current)
            .map(|i| (i + 1) % models.len())
            .unwrap_or(0);
        let model = &models[next];
        let (label, prefix) = state.config.model_params(model);

        state.store.select_model(model, label, prefix);
        tracing::info!("Model changed to: {}", model);
        cx.notify();
    }

    fn render_header(&self, theme: &Theme, cx: &Context<Self>) -> impl IntoElement {
        let submit = cx.global::<ConvoState>().store.submit_state();

        div()
            .flex()
            .items_center()
            .justify_between()
            .px(px(20.0))
            .py(px(12.0))
            .border_b_1()
            .border_color(theme.border)
            .bg(theme.background_panel)
            .child(
                div()
                    .flex()
                    .items_center()
                    .gap(px(12.0))
                    .child(div().font_weight(FontWeight::MEDIUM).child("Convo"))
                    .when(submit.is_submitting, |el| {
                        el.child(
                            div()
                                .text_sm()
                                .text_color(theme.text_muted)
                                .child("Generating..."),
                        )
                    }),
            )
            .child(
                div()
                    .id("model-picker")
                    .flex()
                    .items_center()
                    .gap(px(6.0))
                    .px(px(10.0))
                    .py(px(4.0))
                    .rounded(px(6.0))
                    .bg(theme.background_element)
                    .cursor_pointer()
                    .hover(|s| s.bg(theme.background))
                    .on_click(cx.listener(|this, _event, _window, cx| {
                        this.cycle_model(cx);
                    }))
                    .child(div().text_sm().text_color(theme.text_muted).child("Model"))
                    .child(div().text_sm().child(submit.model.clone())),
            )
    }

    fn render_empty(&self, theme: &Theme) -> impl IntoElement {
        div()
            .flex_1()
            .flex()
            .flex_col()
            .items_center()
            .justify_center()
            .gap(px(16.0))
            .child(
                div()
                    .text_xl()
                    .font_weight(FontWeight::MEDIUM)
                    .child("No Messages"),
            )
            .child(
                div()
                    .text_color(theme.text_muted)
                    .child("Open a conversation file to browse and edit it"),
            )
    }

    fn render_row(
        &self,
        row: &MessageView,
        parent: Option<String>,
        theme: &Theme,
        cx: &Context<Self>,
    ) -> AnyElement {
        let bg = match row.row {
            RowStyle::User => theme.user_row,
            RowStyle::Assistant => theme.assistant_row,
        };
        let wheel_id = row.message_id.clone();
        let group = SharedString::from(format!("row-{}", row.message_id));
        let show_switch = row.sibling_switch.visible();

        div()
            .group(group.clone())
            .w_full()
            .bg(bg)
            .border_b_1()
            .border_color(theme.border_subtle)
            .on_scroll_wheel(cx.listener(move |this, _event: &ScrollWheelEvent, _window, cx| {
                this.thread.wheel(&wheel_id);
                cx.notify();
            }))
            .child(
                div()
                    .max_w(rems(48.0))
                    .mx_auto()
                    .flex()
                    .gap(px(16.0))
                    .px(px(16.0))
                    .py(px(20.0))
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .items_center()
                            .gap(px(6.0))
                            .child(self.render_icon(&row.icon, row.icon_scrolls_rtl, theme))
                            // Shown on hover only
                            .when(show_switch, |el| {
                                el.child(
                                    div()
                                        .opacity(0.0)
                                        .group_hover(group, |s| s.opacity(1.0))
                                        .child(self.render_sibling_switch(
                                            "hover",
                                            row,
                                            parent.clone(),
                                            theme,
                                            cx,
                                        )),
                                )
                            }),
                    )
                    .child(
                        div()
                            .flex_1()
                            .min_w(px(0.0))
                            .flex()
                            .flex_col()
                            .gap(px(8.0))
                            .text_color(theme.text)
                            .child(self.render_body(row, theme))
                            .when(show_switch, |el| {
                                let switch =
                                    self.render_sibling_switch("inline", row, parent, theme, cx);
                                el.child(switch)
                            }),
                    )
                    .when(row.hover_buttons.visible, |el| {
                        let message_id = row.message_id.clone();
                        el.child(
                            div()
                                .id(element_id("edit", &row.message_id))
                                .px(px(6.0))
                                .h(px(24.0))
                                .rounded(px(4.0))
                                .text_xs()
                                .text_color(theme.text_muted)
                                .cursor_pointer()
                                .hover(|s| s.bg(theme.background_element).text_color(theme.text))
                                .on_click(cx.listener(move |this, _event, _window, cx| {
                                    this.begin_edit(&message_id, cx);
                                }))
                                .child("Edit"),
                        )
                    }),
            )
            .into_any_element()
    }

    fn render_icon(&self, icon: &Icon, scrolls_rtl: bool, theme: &Theme) -> impl IntoElement {
        let frame = div()
            .w(px(30.0))
            .h(px(30.0))
            .rounded(px(4.0))
            .flex()
            .items_center()
            .overflow_hidden()
            .text_xs();

        match icon {
            Icon::Text(label) => frame
                .bg(theme.background_element)
                .when(scrolls_rtl, |el| el.justify_end())
                .when(!scrolls_rtl, |el| el.justify_center())
                .child(label.clone()),
            Icon::Element(IconElement::UserAvatar) => frame
                .justify_center()
                .bg(theme.primary.opacity(0.3))
                .child("U"),
            Icon::Element(IconElement::Badge { model, color, error }) => frame
                .justify_center()
                .bg(theme.badge(color.as_deref()))
                .text_color(theme.background)
                .when(*error, |el| el.border_1().border_color(theme.error))
                .child(
                    model
                        .chars()
                        .next()
                        .map(|c| c.to_uppercase().to_string())
                        .unwrap_or_default(),
                ),
        }
    }

    fn render_sibling_switch(
        &self,
        slot: &str,
        row: &MessageView,
        parent: Option<String>,
        theme: &Theme,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let switch = row.sibling_switch;
        let count = switch.sibling_count;
        let prev_parent = parent.clone();
        let next_parent = parent;

        let arrow = |id: ElementId, label: &'static str, enabled: bool| {
            div()
                .id(id)
                .px(px(2.0))
                .text_color(if enabled { theme.text } else { theme.text_muted })
                .when(enabled, |el| el.cursor_pointer())
                .child(label)
        };

        div()
            .flex()
            .items_center()
            .gap(px(2.0))
            .text_xs()
            .child(
                arrow(
                    element_id(&format!("{}-prev", slot), &row.message_id),
                    "<",
                    switch.previous().is_some(),
                )
                    .when_some(switch.previous(), |el, idx| {
                        el.on_click(cx.listener(move |this, _event, _window, cx| {
                            this.select_sibling(prev_parent.as_deref(), idx, count, cx);
                        }))
                    }),
            )
            .child(div().text_color(theme.text_muted).child(switch.label()))
            .child(
                arrow(
                    element_id(&format!("{}-next", slot), &row.message_id),
                    ">",
                    switch.next().is_some(),
                )
                    .when_some(switch.next(), |el, idx| {
                        el.on_click(cx.listener(move |this, _event, _window, cx| {
                            this.select_sibling(next_parent.as_deref(), idx, count, cx);
                        }))
                    }),
            )
    }

    fn render_body(&self, row: &MessageView, theme: &Theme) -> AnyElement {
        match &row.body {
            MessageBody::Error { text } => div()
                .px(px(12.0))
                .py(px(8.0))
                .rounded(px(6.0))
                .bg(theme.error.opacity(0.1))
                .border_1()
                .border_color(theme.error)
                .text_color(theme.error)
                .child(text.clone())
                .into_any_element(),
            MessageBody::Edit { draft, .. } => match &self.edit_input {
                Some(input) => input.clone().into_any_element(),
                None => div().child(draft.clone()).into_any_element(),
            },
            MessageBody::Plain { text } => div().child(text.clone()).into_any_element(),
            MessageBody::Wrapped(wrapped) => self.render_wrapped(wrapped, theme).into_any_element(),
        }
    }

    fn render_wrapped(&self, wrapped: &WrappedText, theme: &Theme) -> impl IntoElement {
        div()
            .flex()
            .flex_col()
            .gap(px(8.0))
            .children(wrapped.blocks.iter().map(|block| match block {
                TextBlock::Prose { text } => div().child(text.clone()),
                TextBlock::Code { lang, code } => div()
                    .rounded(px(6.0))
                    .bg(theme.background)
                    .border_1()
                    .border_color(theme.border_subtle)
                    .overflow_hidden()
                    .when_some(lang.clone(), |el, lang| {
                        el.child(
                            div()
                                .px(px(12.0))
                                .py(px(4.0))
                                .bg(theme.background_element)
                                .text_xs()
                                .text_color(theme.text_muted)
                                .child(lang),
                        )
                    })
                    .child(
                        div()
                            .px(px(12.0))
                            .py(px(8.0))
                            .text_sm()
                            .font_family("monospace")
                            .text_color(theme.code)
                            .child(code.clone()),
                    ),
            }))
            .when_some(wrapped.cursor, |el, cursor| {
                el.child(
                    div()
                        .text_color(theme.cursor)
                        .child(cursor.glyph.to_string()),
                )
            })
    }
}

impl Render for ConversationView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let view = self.render_thread(cx);
        self.sync_edit_input(view.as_ref(), window, cx);

        let theme = cx.global::<Theme>();
        let content = match &view {
            Some(view) => {
                let path = view.path();
                let rows: Vec<AnyElement> = path
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        // Roots have no parent key
                        let parent = i.checked_sub(1).map(|p| path[p].message_id.clone());
                        self.render_row(row, parent, theme, cx)
                    })
                    .collect();
                div()
                    .id("conversation-scroll")
                    .flex_1()
                    .overflow_y_scroll()
                    .track_scroll(&self.scroll_handle)
                    .children(rows)
                    .into_any_element()
            }
            None => self.render_empty(theme).into_any_element(),
        };

        div()
            .key_context(CONVERSATION_CONTEXT)
            .track_focus(&self.focus_handle)
            .on_action(cx.listener(|this, _: &CycleModel, _window, cx| {
                this.cycle_model(cx);
            }))
            .on_action(cx.listener(|_this, _: &ToggleTheme, _window, cx| {
                toggle_theme_mode(cx);
                cx.notify();
            }))
            .size_full()
            .flex()
            .flex_col()
            .bg(theme.background)
            .text_color(theme.text)
            .child(self.render_header(theme, cx))
            .child(content)
    }
}
