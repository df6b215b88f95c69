//! Depth-first rendering of a conversation tree.
//!
//! At every level only one sibling is shown. The thread remembers, per
//! parent, which sibling is selected and owns the UI state that has to
//! survive between renders: the edit focus and each message's local state.
//!
//! Local state lives only as long as its message is rendered. Switching to
//! another sibling unmounts the hidden branch, and showing it again starts
//! from fresh state.

use crate::ids::IdGenerator;
use crate::message::{cancel_edit, MessageComponent, MessageState, RenderDeps, ScrollHost};
use crate::store::Store;
use crate::tree::find_with_siblings;
use crate::types::{Message, MessageId};
use crate::view::MessageView;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Selected sibling of one parent, counted from the newest (0 = newest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SiblingSelection {
    from_newest: usize,
    count: usize,
}

/// Rendering state of a whole conversation.
#[derive(Debug, Default)]
pub struct Thread {
    current_edit: Option<MessageId>,
    /// Keyed by parent message id; `None` is the list of roots
    selections: HashMap<Option<MessageId>, SiblingSelection>,
    states: HashMap<MessageId, MessageState>,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the selected path starting from the root list.
    pub fn render<S: Store + ?Sized>(
        &mut self,
        roots: &[Message],
        messages: &[Message],
        store: &mut S,
        host: &mut dyn ScrollHost,
        deps: &RenderDeps,
    ) -> Option<MessageView> {
        let mut rendered = HashSet::new();
        let view = self.render_siblings(None, roots, messages, store, host, deps, &mut rendered);
        self.states.retain(|id, _| rendered.contains(id));
        view
    }

    #[allow(clippy::too_many_arguments)]
    fn render_siblings<S: Store + ?Sized>(
        &mut self,
        parent: Option<&str>,
        siblings: &[Message],
        messages: &[Message],
        store: &mut S,
        host: &mut dyn ScrollHost,
        deps: &RenderDeps,
        rendered: &mut HashSet<MessageId>,
    ) -> Option<MessageView> {
        if siblings.is_empty() {
            return None;
        }
        let count = siblings.len();

        let selection = self
            .selections
            .entry(parent.map(str::to_string))
            .or_insert(SiblingSelection {
                from_newest: 0,
                count,
            });
        // A new sibling arrived or one went away: jump to the newest
        if selection.count != count || selection.from_newest >= count {
            selection.from_newest = 0;
            selection.count = count;
        }

        let sibling_idx = count - selection.from_newest - 1;
        let message = &siblings[sibling_idx];
        let component = MessageComponent::new(message, messages, sibling_idx, count);

        rendered.insert(message.message_id.clone());
        let state = self.states.entry(message.message_id.clone()).or_default();
        let mut view = component.render(state, store, host, self.current_edit.as_deref(), deps);

        view.child = self
            .render_siblings(
                Some(&message.message_id),
                &message.children,
                messages,
                store,
                host,
                deps,
                rendered,
            )
            .map(Box::new);
        Some(view)
    }

    /// Message currently in edit mode.
    pub fn current_edit(&self) -> Option<&str> {
        self.current_edit.as_deref()
    }

    /// Put a message into edit mode, taking focus from any other.
    pub fn enter_edit(&mut self, message_id: &str) {
        self.current_edit = Some(message_id.to_string());
        tracing::debug!("editing {}", message_id);
    }

    pub fn cancel_edit(&mut self) {
        cancel_edit(&mut self.current_edit);
    }

    /// Wheel event on a rendered message.
    pub fn wheel(&mut self, message_id: &str) {
        if let Some(state) = self.states.get_mut(message_id) {
            state.handle_wheel();
        }
    }

    pub fn abort_scroll(&self, message_id: &str) -> bool {
        self.states
            .get(message_id)
            .map(|s| s.abort_scroll())
            .unwrap_or(false)
    }

    /// Select sibling `sibling_idx` (0 = oldest) among the children of `parent`.
    pub fn select_sibling(&mut self, parent: Option<&str>, sibling_idx: usize, count: usize) {
        set_sibling_idx(&mut self.selections, parent, sibling_idx, count);
    }

    /// Selected sibling index (0 = oldest) among the children of `parent`.
    pub fn sibling_idx(&self, parent: Option<&str>) -> Option<usize> {
        self.selections
            .get(&parent.map(str::to_string))
            .and_then(|s| s.count.checked_sub(s.from_newest + 1))
    }

    /// Save an edited message as a new submission.
    ///
    /// Returns `Ok(false)` when the save was ignored (empty text or a
    /// submission already in flight).
    #[allow(clippy::too_many_arguments)]
    pub fn save<S: Store + ?Sized>(
        &mut self,
        message_id: &str,
        edited: &str,
        roots: &[Message],
        messages: &[Message],
        store: &mut S,
        deps: &RenderDeps,
        ids: &mut dyn IdGenerator,
    ) -> Result<bool> {
        let (message, count) = find_with_siblings(roots, message_id)
            .ok_or_else(|| Error::MessageNotFound(message_id.to_string()))?;
        let parent = if roots.iter().any(|m| m.message_id == message_id) {
            None
        } else {
            message.parent_message_id.as_deref()
        };
        let sibling_idx = self.sibling_idx(parent).unwrap_or(count - 1);

        let component = MessageComponent::new(message, messages, sibling_idx, count);
        let selections = &mut self.selections;
        Ok(component.resubmit(edited, store, deps, ids, &mut self.current_edit, |idx| {
            set_sibling_idx(selections, parent, idx, count)
        }))
    }
}

fn set_sibling_idx(
    selections: &mut HashMap<Option<MessageId>, SiblingSelection>,
    parent: Option<&str>,
    sibling_idx: usize,
    count: usize,
) {
    if count == 0 {
        return;
    }
    let idx = sibling_idx.min(count - 1);
    selections.insert(
        parent.map(str::to_string),
        SiblingSelection {
            from_newest: count - idx - 1,
            count,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvoConfig;
    use crate::ids::SequentialIds;
    use crate::message::NoScroll;
    use crate::store::MemoryStore;
    use crate::tree::build_tree;
    use crate::types::ROOT_PARENT_ID;
    use crate::view::MessageBody;

    fn conversation() -> Vec<Message> {
        vec![
            Message::user("u1", Some(ROOT_PARENT_ID), "Hi"),
            Message::assistant("a1", Some("u1"), "chatgpt", "Hello"),
            Message::assistant("a2", Some("u1"), "chatgpt", "Hey there"),
            Message::user("u2", Some("a1"), "Tell me a joke"),
        ]
    }

    fn store(messages: Vec<Message>) -> MemoryStore {
        MemoryStore::new(&ConvoConfig::default()).with_messages(messages)
    }

    fn render(thread: &mut Thread, store: &mut MemoryStore) -> MessageView {
        let messages = store.messages().to_vec();
        let roots = build_tree(&messages);
        thread
            .render(&roots, &messages, store, &mut NoScroll, &RenderDeps::default())
            .unwrap()
    }

    fn path_ids(view: &MessageView) -> Vec<&str> {
        view.path().iter().map(|v| v.message_id.as_str()).collect()
    }

    #[test]
    fn test_empty_conversation_renders_nothing() {
        let mut thread = Thread::new();
        let mut store = store(Vec::new());
        let view = thread.render(&[], &[], &mut store, &mut NoScroll, &RenderDeps::default());
        assert!(view.is_none());
    }

    #[test]
    fn test_newest_sibling_selected_by_default() {
        let mut thread = Thread::new();
        let mut store = store(conversation());
        let view = render(&mut thread, &mut store);

        assert_eq!(path_ids(&view), vec!["u1", "a2"]);
        let a2 = view.child.as_deref().unwrap();
        assert_eq!(a2.sibling_switch.sibling_idx, 1);
        assert_eq!(a2.sibling_switch.sibling_count, 2);
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("a2"));
    }

    #[test]
    fn test_select_older_sibling_walks_its_branch() {
        let mut thread = Thread::new();
        let mut store = store(conversation());
        render(&mut thread, &mut store);

        thread.select_sibling(Some("u1"), 0, 2);
        let view = render(&mut thread, &mut store);
        assert_eq!(path_ids(&view), vec!["u1", "a1", "u2"]);
        assert_eq!(thread.sibling_idx(Some("u1")), Some(0));
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("u2"));
    }

    #[test]
    fn test_reselected_sibling_announces_itself_again() {
        let mut thread = Thread::new();
        let mut store = store(conversation());
        render(&mut thread, &mut store);
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("a2"));

        thread.select_sibling(Some("u1"), 0, 2);
        render(&mut thread, &mut store);
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("u2"));

        thread.select_sibling(Some("u1"), 1, 2);
        let view = render(&mut thread, &mut store);
        assert_eq!(path_ids(&view), vec!["u1", "a2"]);
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("a2"));

        thread.select_sibling(Some("u1"), 0, 2);
        render(&mut thread, &mut store);
        assert_eq!(store.conversation().parent_message_id.as_deref(), Some("u2"));
    }

    #[derive(Default)]
    struct CountingHost {
        scrolls: usize,
    }

    impl ScrollHost for CountingHost {
        fn scroll_to_bottom(&mut self) {
            self.scrolls += 1;
        }
    }

    #[test]
    fn test_streaming_leaf_scrolls_again_when_shown() {
        let mut thread = Thread::new();
        let mut streaming = Message::assistant("a2", Some("u1"), "chatgpt", "Hel");
        streaming.submitting = true;
        let mut store = store(vec![
            Message::user("u1", None, "Hi"),
            Message::assistant("a1", Some("u1"), "chatgpt", "Hello"),
            streaming,
        ]);
        store.set_submit_state(true);

        let messages = store.messages().to_vec();
        let roots = build_tree(&messages);
        let deps = RenderDeps::default();
        let mut host = CountingHost::default();

        thread.render(&roots, &messages, &mut store, &mut host, &deps);
        thread.render(&roots, &messages, &mut store, &mut host, &deps);
        assert_eq!(host.scrolls, 1);
        thread.wheel("a2");
        assert!(thread.abort_scroll("a2"));

        thread.select_sibling(Some("u1"), 0, 2);
        thread.render(&roots, &messages, &mut store, &mut host, &deps);
        assert_eq!(host.scrolls, 1);
        assert!(!thread.abort_scroll("a2"));

        thread.select_sibling(Some("u1"), 1, 2);
        let view = thread
            .render(&roots, &messages, &mut store, &mut host, &deps)
            .unwrap();
        assert!(view.path()[1].body.has_cursor());
        assert_eq!(host.scrolls, 2);
    }

    #[test]
    fn test_select_with_no_siblings_is_ignored() {
        let mut thread = Thread::new();
        thread.select_sibling(Some("u1"), 0, 0);
        assert_eq!(thread.sibling_idx(Some("u1")), None);

        thread.select_sibling(Some("u1"), 5, 2);
        assert_eq!(thread.sibling_idx(Some("u1")), Some(1));
    }

    #[test]
    fn test_new_sibling_resets_to_newest() {
        let mut thread = Thread::new();
        let mut store = store(conversation());
        render(&mut thread, &mut store);
        thread.select_sibling(Some("u1"), 0, 2);

        let mut messages = conversation();
        messages.push(Message::assistant("a3", Some("u1"), "chatgpt", "Yo"));
        store.set_messages(messages);

        let view = render(&mut thread, &mut store);
        assert_eq!(path_ids(&view), vec!["u1", "a3"]);
    }

    #[test]
    fn test_single_edit_focus() {
        let mut thread = Thread::new();
        thread.enter_edit("u1");
        thread.enter_edit("u2");
        assert_eq!(thread.current_edit(), Some("u2"));

        let mut store = store(conversation());
        thread.select_sibling(Some("u1"), 0, 2);
        let view = render(&mut thread, &mut store);
        let edits = view.path().iter().filter(|v| v.body.is_edit()).count();
        assert_eq!(edits, 1);

        thread.cancel_edit();
        assert_eq!(thread.current_edit(), None);
    }

    #[test]
    fn test_save_adds_branch_and_exits_edit() {
        let mut thread = Thread::new();
        let mut store = store(conversation());
        thread.select_sibling(Some("u1"), 0, 2);
        render(&mut thread, &mut store);
        thread.enter_edit("u2");

        let messages = store.messages().to_vec();
        let roots = build_tree(&messages);
        let mut ids = SequentialIds::new("tmp");
        let saved = thread
            .save("u2", "Hello", &roots, &messages, &mut store, &RenderDeps::default(), &mut ids)
            .unwrap();

        assert!(saved);
        assert_eq!(thread.current_edit(), None);
        assert_eq!(store.messages().len(), messages.len() + 2);

        let view = render(&mut thread, &mut store);
        assert_eq!(path_ids(&view), vec!["u1", "a1", "tmp-1", "tmp-2"]);
        let leaf = *view.path().last().unwrap();
        assert!(leaf.body.has_cursor());

        let edited = view.path()[2];
        assert_eq!(edited.sibling_switch.sibling_idx, 1);
        assert_eq!(edited.sibling_switch.sibling_count, 2);
        assert_eq!(edited.body, MessageBody::Plain { text: "Hello".to_string() });
    }

    #[test]
    fn test_save_unknown_message() {
        let mut thread = Thread::new();
        let mut store = store(conversation());
        let messages = store.messages().to_vec();
        let roots = build_tree(&messages);

        let result = thread.save(
            "missing",
            "Hello",
            &roots,
            &messages,
            &mut store,
            &RenderDeps::default(),
            &mut SequentialIds::new("tmp"),
        );
        assert!(matches!(result, Err(Error::MessageNotFound(_))));
    }

    #[test]
    fn test_wheel_routes_to_message_state() {
        let mut thread = Thread::new();
        let mut response = Message::assistant("a1", Some("u1"), "chatgpt", "");
        response.submitting = true;
        let mut store = store(vec![Message::user("u1", None, "Hi"), response]);
        store.set_submit_state(true);

        let view = render(&mut thread, &mut store);
        assert!(view.path()[1].body.has_cursor());

        thread.wheel("a1");
        assert!(thread.abort_scroll("a1"));
        let view = render(&mut thread, &mut store);
        assert!(!view.path()[1].body.has_cursor());
    }
}
