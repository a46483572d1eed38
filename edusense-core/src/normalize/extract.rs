//! Best-effort location of a JSON block inside free-form model output.
//!
//! This is a heuristic, not a parser: it takes everything from the first
//! opening delimiter to the last closing delimiter. Prose containing stray
//! braces, or several JSON blocks, can produce a block that fails to parse;
//! the caller then treats the provider as failed.

use serde::{Deserialize, Serialize};

/// Upper bound on how much of a response is scanned for a JSON block.
pub const MAX_SCAN_BYTES: usize = 64 * 1024;

/// Expected top-level container of a structured response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    /// Opening and closing delimiters
    pub fn delimiters(self) -> (char, char) {
        match self {
            Shape::Object => ('{', '}'),
            Shape::Array => ('[', ']'),
        }
    }
}

/// Greedy scan from the first opening to the last closing delimiter of
/// `shape`, within the first [`MAX_SCAN_BYTES`] of `text`.
pub fn extract_json_block(text: &str, shape: Shape) -> Option<&str> {
    extract_json_block_within(text, shape, MAX_SCAN_BYTES)
}

/// Same as [`extract_json_block`] with an explicit scan limit.
pub fn extract_json_block_within(text: &str, shape: Shape, limit: usize) -> Option<&str> {
    let window = scan_window(text, limit);
    let (open, close) = shape.delimiters();

    let start = window.find(open)?;
    let end = window.rfind(close)?;
    if start < end {
        Some(&window[start..=end])
    } else {
        None
    }
}

fn scan_window(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Drop lines that are nothing but a `//` comment. Models often echo the
/// `// more items...` marker from the prompt template.
pub fn strip_line_comments(block: &str) -> String {
    block
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove commas that directly precede a closing `}` or `]`, ignoring
/// anything inside string literals.
pub fn remove_trailing_commas(block: &str) -> String {
    let chars: Vec<char> = block.chars().collect();
    let mut out = String::with_capacity(block.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
