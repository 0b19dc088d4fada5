//! Text-level fidelity passes applied after tree serialization
//!
//! The tree serializer normalizes markup (attribute order, void elements,
//! foreign content). These functions work purely on strings and patch the
//! serialized output back toward the original source, then place queued
//! insertions in front of the closing `</head>` and `</body>` tags.

use std::collections::BTreeMap;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::utils::{FOREIGN_CONTENT_TAGS, VOID_TAGS};

lazy_static! {
    static ref HEAD_CLOSE_AT_LINE_START: Regex = Regex::new(r"(?im)^([ \t]*)(</\s*head\s*>)")
        .expect("BUG: hardcoded </head> regex is invalid - this is a compile-time bug");
    static ref BODY_CLOSE_AT_LINE_START: Regex = Regex::new(r"(?im)^([ \t]*)(</\s*body\s*>)")
        .expect("BUG: hardcoded </body> regex is invalid - this is a compile-time bug");
    static ref HEAD_CLOSE: Regex = Regex::new(r"(?i)</\s*head\s*>")
        .expect("BUG: hardcoded </head> regex is invalid - this is a compile-time bug");
    static ref BODY_CLOSE: Regex = Regex::new(r"(?i)</\s*body\s*>")
        .expect("BUG: hardcoded </body> regex is invalid - this is a compile-time bug");
}

/// Closing tag in front of which queued markup is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingTag {
    Head,
    Body,
}

impl ClosingTag {
    fn patterns(self) -> (&'static Regex, &'static Regex) {
        match self {
            ClosingTag::Head => (&HEAD_CLOSE_AT_LINE_START, &HEAD_CLOSE),
            ClosingTag::Body => (&BODY_CLOSE_AT_LINE_START, &BODY_CLOSE),
        }
    }
}

/// Detect the indentation unit used in a piece of markup
///
/// Counts indentation changes between consecutive non-blank lines and
/// returns the most frequent one, preferring the narrower unit on ties.
/// Returns an empty string when the text has no indentation.
#[must_use]
pub fn detect_indent(text: &str) -> String {
    let mut usage: BTreeMap<(char, usize), usize> = BTreeMap::new();
    let mut previous: (Option<char>, usize) = (None, 0);

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        let kind = line.chars().next().filter(|c| *c == ' ' || *c == '\t');
        let (previous_kind, previous_width) = previous;

        let diff = width.abs_diff(previous_width);
        if diff > 0
            && let Some(unit) = kind.or(previous_kind)
        {
            *usage.entry((unit, diff)).or_default() += 1;
        }

        previous = (kind, width);
    }

    usage
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.1.cmp(&a.0.1)))
        .map(|((unit, width), _)| unit.to_string().repeat(width))
        .unwrap_or_default()
}

/// Byte ranges of every `<tag ...>...</tag>` span, matched case-insensitively
///
/// Self-closing open tags form a span of their own. Spans starting inside a
/// previous span are skipped, so nested occurrences are covered by the outer one.
#[must_use]
pub fn partials(html: &str, tag: &str) -> Vec<Range<usize>> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let bytes = lower.as_bytes();

    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find(&open) {
        let start = cursor + found;
        let after_name = start + open.len();
        cursor = after_name;

        match bytes.get(after_name) {
            Some(b'>' | b'/') => {}
            Some(b) if b.is_ascii_whitespace() => {}
            _ => continue,
        }

        let Some(open_end) = lower[start..].find('>').map(|i| start + i + 1) else {
            break;
        };

        let end = if lower[start..open_end].ends_with("/>") {
            open_end
        } else {
            match lower[open_end..].find(&close) {
                Some(i) => open_end + i + close.len(),
                None => continue,
            }
        };

        spans.push(start..end);
        cursor = end;
    }

    spans
}

/// Replace every `tag` span in `source` with the span of the same ordinal in `dest`
///
/// Returns `None` when the two texts do not contain the same number of spans,
/// in which case positional matching would pair up the wrong subtrees.
#[must_use]
pub fn replace_partials(source: &str, dest: &str, tag: &str) -> Option<String> {
    let old_spans = partials(source, tag);
    let new_spans = partials(dest, tag);

    if old_spans.len() != new_spans.len() {
        return None;
    }

    let mut result = String::with_capacity(source.len());
    let mut last = 0;
    for (old, new) in old_spans.iter().zip(&new_spans) {
        result.push_str(&source[last..old.start]);
        result.push_str(&dest[new.clone()]);
        last = old.end;
    }
    result.push_str(&source[last..]);

    Some(result)
}

/// Put the original markup of foreign-content subtrees back into `text`
#[must_use]
pub fn restore_foreign_content(text: &str, original: &str) -> String {
    FOREIGN_CONTENT_TAGS
        .iter()
        .fold(text.to_string(), |current, tag| {
            replace_partials(&current, original, tag).unwrap_or_else(|| {
                log::debug!("Skipping <{tag}> restoration, subtree count changed");
                current
            })
        })
}

/// Swap a serialized `<head>` element into the original source
///
/// Only the `<head>` span of the source is replaced; the rest of the document
/// keeps its original bytes. Foreign content is restored afterwards. Returns
/// `None` when the original has no single explicit `<head>`.
#[must_use]
pub fn reindent(head: &str, original: &str) -> Option<String> {
    if partials(original, "head").len() != 1 || partials(head, "head").len() != 1 {
        return None;
    }
    replace_partials(original, head, "head").map(|text| restore_foreign_content(&text, original))
}

/// End of the start tag beginning at `start`, quoted `>` characters skipped
fn start_tag_end(text: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, c) in text[start..].char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '>') => return Some(start + offset + 1),
            _ => {}
        }
    }
    None
}

/// End of the first `</name>` at or after `from` in lowercased text
fn end_tag_end(lower: &str, from: usize, name: &str) -> Option<usize> {
    let close = format!("</{name}");
    let mut cursor = from;
    while let Some(found) = lower[cursor..].find(&close) {
        let after_name = cursor + found + close.len();
        match lower.as_bytes().get(after_name) {
            Some(b'>') => return Some(after_name + 1),
            Some(b) if b.is_ascii_whitespace() => {
                return lower[after_name..].find('>').map(|i| after_name + i + 1);
            }
            _ => cursor = after_name,
        }
    }
    None
}

/// Top-level elements of a markup fragment as lowercase tag name and byte range
///
/// Comments and text are skipped. Void and self-closing elements end with
/// their start tag, any other element at its first matching end tag.
#[must_use]
pub fn top_level_elements(html: &str) -> Vec<(String, Range<usize>)> {
    let lower = html.to_ascii_lowercase();
    let mut elements = Vec::new();
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find('<') {
        let start = cursor + found;

        if lower[start..].starts_with("<!--") {
            match lower[start..].find("-->") {
                Some(end) => {
                    cursor = start + end + 3;
                    continue;
                }
                None => break,
            }
        }

        let name: String = lower[start + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            cursor = start + 1;
            continue;
        }

        let Some(open_end) = start_tag_end(&lower, start) else {
            break;
        };
        let end = if VOID_TAGS.contains(&name.as_str()) || lower[start..open_end].ends_with("/>") {
            open_end
        } else {
            match end_tag_end(&lower, open_end, &name) {
                Some(end) => end,
                None => break,
            }
        };

        elements.push((name, start..end));
        cursor = end;
    }

    elements
}

/// Insert markup lines in front of the first `</head>` or `</body>`
///
/// When the closing tag starts a line, each item is indented with twice the
/// closing tag's own indentation. Otherwise items go directly in front of it,
/// and without any closing tag they are appended at the end.
#[must_use]
pub fn inject_before_closing(text: &str, tag: ClosingTag, items: &[String]) -> String {
    if items.is_empty() {
        return text.to_string();
    }

    let (at_line_start, anywhere) = tag.patterns();

    if at_line_start.is_match(text) {
        return at_line_start
            .replacen(text, 1, |caps: &Captures| {
                let indent = &caps[1];
                let separator = format!("\n{indent}{indent}");
                format!(
                    "{indent}{indent}{}\n{indent}{}",
                    items.join(&separator),
                    &caps[2]
                )
            })
            .into_owned();
    }

    match anywhere.find(text) {
        Some(found) => {
            let mut result = String::with_capacity(text.len());
            result.push_str(&text[..found.start()]);
            result.push_str(&items.join("\n"));
            result.push_str(&text[found.start()..]);
            result
        }
        None => {
            log::debug!("No closing {tag:?} tag found, appending insertions");
            format!("{text}\n{}", items.join("\n"))
        }
    }
}
