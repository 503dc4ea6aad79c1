//! Turns free text into attachable comment annotations.

use crate::syntax::{Comment, CommentKind};

/// Convert `text` into comment annotations.
///
/// With `multi_as_lines` (the default in every caller), or when the text has
/// no internal line breaks, each line becomes its own single-line annotation.
/// Otherwise the whole text becomes one block annotation with its interior
/// line breaks re-indented behind ` * ` prefixes.
pub fn create_comments(text: &str, multi_as_lines: bool, leading: bool) -> Vec<Comment> {
    if multi_as_lines || !text.contains('\n') {
        text.split('\n')
            .map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                Comment {
                    kind: CommentKind::Line,
                    text: if line.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", line)
                    },
                    leading,
                }
            })
            .collect()
    } else {
        let spaced = if text.is_empty() {
            String::new()
        } else {
            let joined = text
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect::<Vec<_>>()
                .join("\n * ");
            format!(" {}\n ", joined)
        };
        vec![Comment {
            kind: CommentKind::Block,
            text: spaced,
            leading,
        }]
    }
}
