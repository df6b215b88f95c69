//! Building the reply tree from the flat message list.

use crate::types::{Message, ROOT_PARENT_ID};
use crate::Result;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Load a flat message list from a JSON file.
///
/// Accepts either a bare array of messages or an object with a `messages` array.
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    let content = fs::read_to_string(path)?;
    let data: serde_json::Value = serde_json::from_str(&content)?;

    let list = match data {
        serde_json::Value::Object(mut map) => map
            .remove("messages")
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

/// Group a flat message list into root messages with nested children.
///
/// Roots are messages without a parent, parented to the nil UUID, or whose
/// parent is not in the list. Siblings keep list order.
pub fn build_tree(messages: &[Message]) -> Vec<Message> {
    let ids: HashSet<&str> = messages.iter().map(|m| m.message_id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&Message>> = HashMap::new();
    let mut roots = Vec::new();
    for message in messages {
        match message.parent_message_id.as_deref() {
            Some(parent) if parent != ROOT_PARENT_ID && ids.contains(parent) => {
                children.entry(parent).or_default().push(message);
            }
            _ => roots.push(message),
        }
    }

    let mut visited = HashSet::new();
    roots
        .into_iter()
        .map(|m| attach(m, &children, &mut visited))
        .collect()
}

fn attach<'a>(
    message: &'a Message,
    children: &HashMap<&'a str, Vec<&'a Message>>,
    visited: &mut HashSet<&'a str>,
) -> Message {
    let mut node = message.flat();
    // Duplicate ids can link back into an ancestor
    if !visited.insert(message.message_id.as_str()) {
        return node;
    }
    if let Some(kids) = children.get(message.message_id.as_str()) {
        node.children = kids.iter().map(|&k| attach(k, children, visited)).collect();
    }
    node
}

/// Find a message in the tree along with the number of siblings it has
/// (itself included).
pub fn find_with_siblings<'a>(
    roots: &'a [Message],
    message_id: &str,
) -> Option<(&'a Message, usize)> {
    if let Some(found) = roots.iter().find(|m| m.message_id == message_id) {
        return Some((found, roots.len()));
    }
    roots
        .iter()
        .find_map(|m| find_with_siblings(&m.children, message_id))
}

/// Messages along the displayed path, following the newest child at each level.
pub fn newest_path(roots: &[Message]) -> Vec<&Message> {
    let mut path = Vec::new();
    let mut level = roots;
    while let Some(last) = level.last() {
        path.push(last);
        level = &last.children;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<Message> {
        vec![
            Message::user("u1", Some(ROOT_PARENT_ID), "Hi"),
            Message::assistant("a1", Some("u1"), "chatgpt", "Hello"),
            Message::assistant("a2", Some("u1"), "chatgpt", "Hey there"),
            Message::user("u2", Some("a2"), "How are you?"),
        ]
    }

    #[test]
    fn test_build_tree_groups_children() {
        let roots = build_tree(&sample());
        assert_eq!(roots.len(), 1);

        let root = &roots[0];
        assert_eq!(root.message_id, "u1");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].message_id, "a1");
        assert!(root.children[0].is_last());
        assert_eq!(root.children[1].children[0].message_id, "u2");
    }

    #[test]
    fn test_unknown_parent_becomes_root() {
        let messages = vec![
            Message::user("u1", None, "Hi"),
            Message::assistant("x", Some("gone"), "chatgpt", "orphan"),
        ];
        let roots = build_tree(&messages);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1].message_id, "x");
    }

    #[test]
    fn test_find_with_siblings() {
        let roots = build_tree(&sample());

        let (found, count) = find_with_siblings(&roots, "a1").unwrap();
        assert_eq!(found.text, "Hello");
        assert_eq!(count, 2);

        let (found, count) = find_with_siblings(&roots, "u2").unwrap();
        assert_eq!(found.text, "How are you?");
        assert_eq!(count, 1);

        assert!(find_with_siblings(&roots, "nope").is_none());
    }

    #[test]
    fn test_newest_path() {
        let roots = build_tree(&sample());
        let ids: Vec<&str> = newest_path(&roots)
            .iter()
            .map(|m| m.message_id.as_str())
            .collect();
        assert_eq!(ids, vec!["u1", "a2", "u2"]);
    }

    #[test]
    fn test_load_messages_formats() {
        let dir = tempdir().unwrap();

        let bare = dir.path().join("bare.json");
        let json = r#"[{"messageId": "u1", "text": "Hi", "isCreatedByUser": true}]"#;
        fs::write(&bare, json).unwrap();
        let messages = load_messages(&bare).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_created_by_user);

        let wrapped = dir.path().join("wrapped.json");
        let json = r#"{"conversationId": "c1", "messages": [
            {"messageId": "u1"},
            {"messageId": "a1", "parentMessageId": "u1"}
        ]}"#;
        fs::write(&wrapped, json).unwrap();
        let messages = load_messages(&wrapped).unwrap();
        assert_eq!(build_tree(&messages)[0].children[0].message_id, "a1");
    }

    #[test]
    fn test_load_messages_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_messages(&dir.path().join("nope.json")),
            Err(crate::Error::Io(_))
        ));
    }
}
