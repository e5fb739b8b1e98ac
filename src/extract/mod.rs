//! Resilient structured-response extraction.
//!
//! Model completions are frequently cut off at the output-token budget, so
//! a strict parse of the raw text throws away real, usable results. This
//! module recovers the best-effort JSON value from free text through a
//! ladder of salvage strategies, ordered from "assume well-formed" to
//! "assume only fragments are trustworthy":
//!
//! 1. strict parse of the greedy first-open/last-close bracket span;
//! 2. truncation repair: trim trailing garbage, then append the closers
//!    for every scope a string-literal-aware scan finds still open;
//! 3. (arrays) cut at the last complete element boundary and close;
//! 4. (arrays) re-parse every top-level `{...}` span independently and
//!    keep the ones that survive.
//!
//! Every strategy is side-effect-free; [`extract`] never panics and
//! returns `None` only when nothing at all can be recovered.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Expected top-level JSON shape of a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
}

impl Shape {
    fn brackets(self) -> (char, char) {
        match self {
            Shape::Array => ('[', ']'),
            Shape::Object => ('{', '}'),
        }
    }

    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }
}

/// Recover the best-effort JSON value of the given shape from raw text.
///
/// Returns `None` when no salvage strategy yields a parseable structure.
/// A salvaged array may contain fewer elements than the model intended;
/// callers must not assume a fixed length.
pub fn extract(text: &str, shape: Shape) -> Option<Value> {
    let (open, close) = shape.brackets();

    // 1. Direct match: greedy span from first opener to last closer.
    if let Some(span) = direct_span(text, open, close) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return Some(value);
        }
    }

    // 2. Truncation repair on the span from the first opener to the end of
    // the text (there may be no closer at all).
    let start = text.find(open)?;
    let trimmed = trim_trailing_garbage(&text[start..]);
    let repaired = close_open_scopes(&trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        // An array repaired down to nothing means its only element was
        // trimmed away; give the element-level strategies a chance before
        // declaring the response empty.
        let hollow =
            shape == Shape::Array && value.as_array().map_or(false, |a| a.is_empty());
        if !hollow {
            debug!(strategy = "truncation_repair", "recovered structured response");
            return Some(value);
        }
    }

    if shape != Shape::Array {
        return None;
    }

    // 3. Drop the trailing partially-emitted element: cut at the last
    // complete-element boundary and close the array.
    if let Some(idx) = trimmed.rfind("},") {
        let candidate = format!("{}]", &trimmed[..=idx]);
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            debug!(
                strategy = "last_complete_element",
                "recovered structured response"
            );
            return Some(value);
        }
    }

    // 4. Per-element salvage: parse each top-level object span on its own
    // and keep whatever survives.
    let objects: Vec<Value> = top_level_object_spans(&trimmed)
        .into_iter()
        .filter_map(|span| serde_json::from_str::<Value>(span).ok())
        .collect();
    if objects.is_empty() {
        None
    } else {
        debug!(
            strategy = "per_element_salvage",
            recovered = objects.len(),
            "recovered structured response"
        );
        Some(Value::Array(objects))
    }
}

fn direct_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Fixed sequence of tail trims, each a no-op when its pattern does not
/// match at the end of the text.
fn trim_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // incomplete string literal after a comma (array of strings)
            r#",\s*"(?:[^"\\]|\\.)*$"#,
            // incomplete "key": "partial-string pair
            r#",?\s*"[^"]*"\s*:\s*"(?:[^"\\]|\\.)*$"#,
            // incomplete "key": [partial-array pair
            r#",?\s*"[^"]*"\s*:\s*\[[^\]]*$"#,
            // "key": with no value
            r#",?\s*"[^"]*"\s*:\s*$"#,
            // trailing comma
            r#",\s*$"#,
            // incomplete object that never closed
            r#",?\s*\{[^{}]*$"#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn trim_trailing_garbage(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in trim_patterns() {
        if let Some(m) = pattern.find(&out) {
            out.truncate(m.start());
        }
    }
    out
}

/// Append a closer for every scope still open at the end of the text,
/// innermost first.
///
/// The scan toggles in-string state on unescaped `"` and skips the
/// character following a backslash; a counter that ignored string state
/// would miscount brackets inside string values and silently corrupt
/// salvageable data. Stray closers with no matching opener are ignored.
fn close_open_scopes(text: &str) -> String {
    let mut in_string = false;
    let mut escaped = false;
    let mut open_scopes: Vec<char> = Vec::new();

    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '[' | '{' if !in_string => open_scopes.push(c),
            ']' if !in_string => {
                if open_scopes.last() == Some(&'[') {
                    open_scopes.pop();
                }
            }
            '}' if !in_string => {
                if open_scopes.last() == Some(&'{') {
                    open_scopes.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    while let Some(scope) = open_scopes.pop() {
        out.push(if scope == '[' { ']' } else { '}' });
    }
    out
}

/// Byte spans of every top-level `{...}` object whose brace depth returns
/// to zero, using the same string-aware scan as the repair step.
fn top_level_object_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth: i64 = 0;
    let mut span_start = 0usize;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    span_start = i;
                }
                depth += 1;
            }
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[span_start..=i]);
                }
            }
            _ => {}
        }
    }

    spans
}
