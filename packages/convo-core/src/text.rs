//! Text wrapping for model responses.
//!
//! The wrapper splits raw text into blocks the UI can lay out and attaches
//! the streaming cursor after the last block.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};
use serde::{Deserialize, Serialize};

/// Glyph drawn at the end of a streaming response.
pub const CURSOR_GLYPH: char = '█';

/// The blinking cursor shown while a response streams in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub glyph: char,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { glyph: CURSOR_GLYPH }
    }
}

/// One laid-out chunk of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TextBlock {
    Prose { text: String },
    Code {
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        code: String,
    },
}

/// Wrapped response text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedText {
    pub blocks: Vec<TextBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

/// Formats assistant text. `cursor` yields the streaming cursor, if any.
pub trait TextWrapper {
    fn wrap(&self, text: &str, cursor: &dyn Fn() -> Option<Cursor>) -> WrappedText;
}

/// Splits prose from fenced and indented code blocks.
///
/// Prose blocks are verbatim slices of the source, so list markers, links,
/// raw HTML and rules reach the UI unchanged. Only code bodies are unwrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownWrapper;

impl TextWrapper for MarkdownWrapper {
    fn wrap(&self, text: &str, cursor: &dyn Fn() -> Option<Cursor>) -> WrappedText {
        let mut blocks = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;
        let mut depth = 0usize;
        // End of the last top-level block taken from `text`
        let mut covered = 0;

        for (event, range) in Parser::new(text).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if depth == 0 {
                        push_prose(&text[covered..range.start], &mut blocks);
                        covered = range.start;
                        if let Tag::CodeBlock(kind) = tag {
                            code = Some((fence_lang(&kind), String::new()));
                        }
                    }
                    depth += 1;
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        match code.take() {
                            Some((lang, code)) => blocks.push(TextBlock::Code { lang, code }),
                            None => push_prose(&text[covered..range.end], &mut blocks),
                        }
                        covered = range.end;
                    }
                }
                Event::Text(t) if depth > 0 => {
                    if let Some((_, body)) = code.as_mut() {
                        body.push_str(&t);
                    }
                }
                _ if depth == 0 => {
                    push_prose(&text[covered..range.end], &mut blocks);
                    covered = range.end;
                }
                _ => {}
            }
        }
        // Link reference definitions produce no events
        push_prose(&text[covered..], &mut blocks);

        WrappedText {
            blocks,
            cursor: cursor(),
        }
    }
}

fn fence_lang(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

fn push_prose(source: &str, blocks: &mut Vec<TextBlock>) {
    let text = source.trim_start_matches(['\r', '\n']).trim_end();
    if !text.trim().is_empty() {
        blocks.push(TextBlock::Prose {
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_cursor() -> Option<Cursor> {
        None
    }

    #[test]
    fn test_plain_paragraphs() {
        let wrapped = MarkdownWrapper.wrap("First line\nsame paragraph\n\nSecond", &no_cursor);
        assert_eq!(
            wrapped.blocks,
            vec![
                TextBlock::Prose { text: "First line\nsame paragraph".to_string() },
                TextBlock::Prose { text: "Second".to_string() },
            ]
        );
        assert!(wrapped.cursor.is_none());
    }

    #[test]
    fn test_fenced_code_block() {
        let text = "Try this:\n\n```rust\nfn main() {}\n```\n\nDone.";
        let wrapped = MarkdownWrapper.wrap(text, &no_cursor);
        assert_eq!(wrapped.blocks.len(), 3);
        assert_eq!(
            wrapped.blocks[1],
            TextBlock::Code {
                lang: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            }
        );
    }

    #[test]
    fn test_prose_keeps_markdown_source() {
        let text = "Steps:\n\n1. install\n2. run\n\n<div>raw html line</div>\n\n***\n\n\
                    See [docs](https://x.y) and **bold**.\n\n[ref]: https://x.y/ref";
        let wrapped = MarkdownWrapper.wrap(text, &no_cursor);
        let prose: Vec<&str> = wrapped
            .blocks
            .iter()
            .map(|block| match block {
                TextBlock::Prose { text } => text.as_str(),
                TextBlock::Code { .. } => panic!("unexpected code block"),
            })
            .collect();
        assert_eq!(
            prose,
            vec![
                "Steps:",
                "1. install\n2. run",
                "<div>raw html line</div>",
                "***",
                "See [docs](https://x.y) and **bold**.",
                "[ref]: https://x.y/ref",
            ]
        );
    }

    #[test]
    fn test_fence_info_keeps_language_only() {
        let wrapped = MarkdownWrapper.wrap("```rust ignore\nlet x = 1;\n```", &no_cursor);
        assert_eq!(
            wrapped.blocks,
            vec![TextBlock::Code {
                lang: Some("rust".to_string()),
                code: "let x = 1;\n".to_string(),
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_while_streaming() {
        let wrapped = MarkdownWrapper.wrap("```py\nprint(1)", &|| Some(Cursor::default()));
        assert!(matches!(
            &wrapped.blocks[0],
            TextBlock::Code { code, .. } if code.starts_with("print(1)")
        ));
        assert_eq!(wrapped.cursor, Some(Cursor { glyph: CURSOR_GLYPH }));
    }

    #[test]
    fn test_empty_text_still_carries_cursor() {
        let wrapped = MarkdownWrapper.wrap("", &|| Some(Cursor::default()));
        assert!(wrapped.blocks.is_empty());
        assert!(wrapped.cursor.is_some());
    }
}
