//! Rendering of a single message and its edit/resubmit flow.
//!
//! A [`MessageComponent`] borrows the message and the props its parent passes
//! down. Everything that outlives a render (the scroll-abort flag, the values
//! the effects compare against) lives in [`MessageState`], owned by the
//! [`Thread`](crate::thread::Thread).

use crate::config::ConvoConfig;
use crate::hover::HoverButtons;
use crate::icon::{DefaultIconResolver, IconRequest, IconResolver};
use crate::ids::IdGenerator;
use crate::sibling::SiblingSwitch;
use crate::store::Store;
use crate::text::{Cursor, MarkdownWrapper, TextWrapper};
use crate::types::{ConversationPatch, Message, MessageId, Submission, SubmissionMessage};
use crate::view::{error_text, MessageBody, MessageView, RowStyle};
use chrono::Utc;

/// Receives auto-scroll requests while a response streams.
pub trait ScrollHost {
    fn scroll_to_bottom(&mut self);
}

/// Host that ignores scroll requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScroll;

impl ScrollHost for NoScroll {
    fn scroll_to_bottom(&mut self) {}
}

/// Collaborators used while rendering.
pub struct RenderDeps {
    pub wrapper: Box<dyn TextWrapper>,
    pub icons: Box<dyn IconResolver>,
    pub user_sender: String,
    pub custom_model: String,
}

impl RenderDeps {
    pub fn from_config(config: &ConvoConfig) -> Self {
        Self {
            wrapper: Box::new(MarkdownWrapper),
            icons: Box::new(DefaultIconResolver::new(
                config.registry(),
                &config.custom_model,
            )),
            user_sender: config.user_sender.clone(),
            custom_model: config.custom_model.clone(),
        }
    }
}

impl Default for RenderDeps {
    fn default() -> Self {
        Self::from_config(&ConvoConfig::default())
    }
}

/// Which of the three mutually exclusive views a message shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Error,
    Edit,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScrollDeps {
    is_submitting: bool,
    text: String,
    blinker: bool,
    abort_scroll: bool,
}

/// Per-message state kept between renders.
#[derive(Debug, Clone, Default)]
pub struct MessageState {
    abort_scroll: bool,
    /// Blinker as of the last render, read by wheel events
    blinker: bool,
    was_last: Option<bool>,
    scroll_deps: Option<ScrollDeps>,
}

impl MessageState {
    pub fn abort_scroll(&self) -> bool {
        self.abort_scroll
    }

    /// Scrolling by hand during a stream stops auto-scroll; any later
    /// scroll once the stream is over re-enables it.
    pub fn handle_wheel(&mut self) {
        self.abort_scroll = self.blinker;
        tracing::trace!("wheel: abort_scroll={}", self.abort_scroll);
    }
}

/// One message with the props its parent renderer passes down.
#[derive(Debug, Clone, Copy)]
pub struct MessageComponent<'a> {
    pub message: &'a Message,
    /// Flat message list of the whole conversation
    pub messages: &'a [Message],
    pub sibling_idx: usize,
    pub sibling_count: usize,
}

impl<'a> MessageComponent<'a> {
    pub fn new(
        message: &'a Message,
        messages: &'a [Message],
        sibling_idx: usize,
        sibling_count: usize,
    ) -> Self {
        Self {
            message,
            messages,
            sibling_idx,
            sibling_count,
        }
    }

    pub fn is_last(&self) -> bool {
        self.message.is_last()
    }

    /// Whether this message is the one currently streaming in.
    pub fn blinker(&self, is_submitting: bool) -> bool {
        self.message.submitting
            && is_submitting
            && self.is_last()
            && !self.message.is_created_by_user
    }

    pub fn is_editing(&self, current_edit: Option<&str>) -> bool {
        current_edit == Some(self.message.message_id.as_str())
    }

    pub fn mode(&self, current_edit: Option<&str>) -> RenderMode {
        if self.message.error {
            RenderMode::Error
        } else if self.is_editing(current_edit) {
            RenderMode::Edit
        } else {
            RenderMode::Normal
        }
    }

    /// Request edit focus for this message.
    pub fn enter_edit(&self, current_edit: &mut Option<MessageId>) {
        *current_edit = Some(self.message.message_id.clone());
    }

    /// Build the row for this message and run its render effects.
    ///
    /// The returned view has no child; the thread fills it in.
    pub fn render<S: Store + ?Sized>(
        &self,
        state: &mut MessageState,
        store: &mut S,
        host: &mut dyn ScrollHost,
        current_edit: Option<&str>,
        deps: &RenderDeps,
    ) -> MessageView {
        let message = self.message;
        let submit = store.submit_state();
        let is_submitting = submit.is_submitting;
        let blinker = self.blinker(is_submitting);
        let show_cursor = blinker && !state.abort_scroll;
        let mode = self.mode(current_edit);

        let body = match mode {
            RenderMode::Error => MessageBody::Error {
                text: error_text(&message.text),
            },
            RenderMode::Edit => MessageBody::Edit {
                draft: message.text.clone(),
                save_enabled: !is_submitting,
            },
            RenderMode::Normal if message.is_created_by_user => MessageBody::Plain {
                text: message.text.clone(),
            },
            RenderMode::Normal => {
                let cursor = || show_cursor.then(Cursor::default);
                MessageBody::Wrapped(deps.wrapper.wrap(&message.text, &cursor))
            }
        };

        let icon = deps.icons.resolve(&IconRequest {
            sender: &message.sender,
            is_created_by_user: message.is_created_by_user,
            model: &submit.model,
            custom_label: submit.custom_label.as_deref(),
            prompt_prefix: submit.prompt_prefix.as_deref(),
            error: message.error,
        });

        let view = MessageView {
            message_id: message.message_id.clone(),
            parent_message_id: message.parent_message_id.clone(),
            row: if message.is_created_by_user {
                RowStyle::User
            } else {
                RowStyle::Assistant
            },
            icon_scrolls_rtl: icon.scrolls_rtl(),
            icon,
            body,
            hover_buttons: HoverButtons::for_message(
                &submit.model,
                message.error,
                message.is_created_by_user,
                mode == RenderMode::Edit,
            ),
            sibling_switch: SiblingSwitch::new(self.sibling_idx, self.sibling_count),
            child: None,
        };

        state.blinker = blinker;
        self.auto_scroll(state, is_submitting, blinker, host);
        self.notify_active_path(state, store);

        view
    }

    fn auto_scroll(
        &self,
        state: &mut MessageState,
        is_submitting: bool,
        blinker: bool,
        host: &mut dyn ScrollHost,
    ) {
        let deps = ScrollDeps {
            is_submitting,
            text: self.message.text.clone(),
            blinker,
            abort_scroll: state.abort_scroll,
        };
        if state.scroll_deps.as_ref() == Some(&deps) {
            return;
        }
        state.scroll_deps = Some(deps);

        if blinker && !state.abort_scroll {
            tracing::trace!("auto-scroll for {}", self.message.message_id);
            host.scroll_to_bottom();
        }
    }

    fn notify_active_path<S: Store + ?Sized>(&self, state: &mut MessageState, store: &mut S) {
        let last = self.is_last();
        if last && state.was_last != Some(true) {
            store.set_conversation(ConversationPatch::parent(&self.message.message_id));
        }
        state.was_last = Some(last);
    }

    /// Resubmit edited text as a new user message next to this one.
    ///
    /// Returns `false` without touching the store when the trimmed text is
    /// empty or a submission is already in flight.
    pub fn resubmit<S: Store + ?Sized>(
        &self,
        edited: &str,
        store: &mut S,
        deps: &RenderDeps,
        ids: &mut dyn IdGenerator,
        current_edit: &mut Option<MessageId>,
        set_sibling_idx: impl FnOnce(usize),
    ) -> bool {
        let text = edited.trim();
        let submit = store.submit_state();
        if submit.is_submitting || text.is_empty() {
            tracing::debug!("resubmit of {} ignored", self.message.message_id);
            return false;
        }
        let model = submit.model.clone();
        let custom_label = submit.custom_label.clone();
        let prompt_prefix = submit.prompt_prefix.clone();

        if store.conversation().error {
            store.set_error(false);
        }

        // Not a real message id; the server assigns one in its response
        let placeholder_id = ids.next_id();
        let is_custom_model = model == deps.custom_model || !store.models().contains(&model);

        let current_msg = Message {
            message_id: placeholder_id.clone(),
            parent_message_id: self.message.parent_message_id.clone(),
            conversation_id: self.message.conversation_id.clone(),
            sender: deps.user_sender.clone(),
            text: text.to_string(),
            is_created_by_user: true,
            current: true,
            ..Default::default()
        };

        let sender = if model == deps.custom_model {
            custom_label.clone().unwrap_or_else(|| model.clone())
        } else {
            model.clone()
        };

        let initial_response = Message {
            message_id: ids.next_id(),
            parent_message_id: Some(placeholder_id),
            sender: sender.clone(),
            submitting: true,
            ..Default::default()
        };

        store.set_submit_state(true);
        let mut messages = self.messages.to_vec();
        messages.push(current_msg.clone());
        messages.push(initial_response.clone());
        store.set_messages(messages);
        store.set_text(String::new());

        let submission = Submission {
            is_custom_model,
            message: SubmissionMessage {
                message: current_msg.clone(),
                model,
                custom_label,
                prompt_prefix,
            },
            messages: self.messages.to_vec(),
            current_msg,
            initial_response,
            sender,
            created_at: Utc::now(),
        };
        tracing::info!("User Input: {}", submission.current_msg.text);
        store.set_submission(submission);

        set_sibling_idx(self.sibling_count.saturating_sub(1));
        *current_edit = None;
        true
    }
}

/// Drop edit focus, whichever message held it.
pub fn cancel_edit(current_edit: &mut Option<MessageId>) {
    *current_edit = None;
}
