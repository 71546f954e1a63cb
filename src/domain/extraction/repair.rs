//! Recovery of a JSON object from loosely formatted model output.
//!
//! Stages run in order and the first one that yields a JSON object wins:
//!
//! 1. strict parse of the whole text
//! 2. parse of a fenced code block
//! 3. parse of the last balanced `{...}` block in the surrounding prose
//! 4. textual repairs (trim to braces, single quotes, bare keys, missing
//!    and trailing commas, unclosed braces) followed by a parse
//!
//! No stage panics or returns an error; a stage either produces an object or
//! passes.

use serde_json::{Map, Value};
use thiserror::Error;

use super::sanitizer::{ResponseSanitizer, SanitizationError};

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStage {
    StrictParse,
    CodeFence,
    LastBalancedBlock,
    TextualRepair,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("Model output rejected: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("No JSON object could be recovered from model output")]
    Unrecoverable,
}

/// A recovered object and the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub object: JsonObject,
    pub stage: RepairStage,
}

type RepairFn = fn(&str) -> Option<JsonObject>;

/// Repair stages in the order they are attempted.
pub(crate) const REPAIR_STAGES: &[(RepairStage, RepairFn)] = &[
    (RepairStage::StrictParse, strict_parse),
    (RepairStage::CodeFence, code_fence),
    (RepairStage::LastBalancedBlock, last_balanced_block),
    (RepairStage::TextualRepair, textual_repair),
];

/// Sanitizes model output and runs the repair stages over it.
#[derive(Debug, Clone, Default)]
pub struct RepairChain {
    sanitizer: ResponseSanitizer,
}

impl RepairChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recover(&self, raw: &str) -> Result<Repaired, RepairError> {
        let cleaned = self.sanitizer.sanitize(raw)?;
        REPAIR_STAGES
            .iter()
            .find_map(|(stage, repair)| {
                repair(&cleaned).map(|object| Repaired {
                    object,
                    stage: *stage,
                })
            })
            .ok_or(RepairError::Unrecoverable)
    }
}

fn as_object(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn parse_object(text: &str) -> Option<JsonObject> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .and_then(as_object)
}

pub(crate) fn strict_parse(text: &str) -> Option<JsonObject> {
    parse_object(text)
}

/// Bodies of fenced code blocks, in order of appearance.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        // Skip the info string ("json") up to the end of the line.
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        match body.find("```") {
            Some(close) => {
                blocks.push(&body[..close]);
                rest = &body[close + 3..];
            }
            None => {
                blocks.push(body);
                break;
            }
        }
    }
    blocks
}

pub(crate) fn code_fence(text: &str) -> Option<JsonObject> {
    fenced_blocks(text)
        .into_iter()
        .rev()
        .find_map(parse_object)
}

/// Top-level balanced `{...}` spans, honouring string literals.
fn balanced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' if depth > 0 => in_string = !in_string,
            _ if in_string => {}
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        blocks.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    blocks
}

pub(crate) fn last_balanced_block(text: &str) -> Option<JsonObject> {
    balanced_blocks(text)
        .into_iter()
        .rev()
        .find_map(parse_object)
}

pub(crate) fn textual_repair(text: &str) -> Option<JsonObject> {
    let source = fenced_blocks(text).into_iter().last().unwrap_or(text);
    let trimmed = trim_to_braces(source)?;
    let repairs: [fn(&str) -> String; 5] = [
        convert_single_quotes,
        quote_bare_keys,
        insert_missing_commas,
        drop_trailing_commas,
        close_open_brackets,
    ];
    let repaired = repairs
        .iter()
        .fold(trimmed.to_string(), |acc, repair| repair(&acc));
    parse_object(&repaired)
}

/// Slice from the first `{` to the last `}`; to the end if no `}` follows.
fn trim_to_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    match text.rfind('}') {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

/// Rewrites `'single'` quoted strings as `"double"` quoted ones.
fn convert_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for c in text.chars() {
        if escape_next {
            escape_next = false;
            out.push(c);
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => {
                escape_next = true;
                out.push(c);
            }
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                out.push('"');
            }
            (Some(q), c) if c == q => {
                quote = None;
                out.push('"');
            }
            (Some('\''), '"') => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps unquoted object keys in double quotes.
fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escape_next = false;
    let mut expecting_key = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if expecting_key && (c.is_alphabetic() || c == '_') {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == ':' {
                out.push('"');
                out.push_str(&ident);
                out.push('"');
            } else {
                out.push_str(&ident);
            }
            expecting_key = false;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                expecting_key = false;
            }
            '{' | ',' => expecting_key = true,
            c if c.is_whitespace() => {}
            _ => expecting_key = false,
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Inserts a comma between a completed value and a following key or object.
fn insert_missing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut escape_next = false;
    // Last significant character outside a string; '"' marks a closed string.
    let mut previous: Option<char> = None;
    // Whether that closed string was followed by ':' (a key).
    let mut after_colon = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
                previous = Some('"');
            }
            continue;
        }
        if c.is_whitespace() {
            out.push(c);
            continue;
        }
        let ends_value = match previous {
            Some('"') => after_colon,
            Some(p) => p == '}' || p == ']' || p.is_ascii_digit() || p == 'e' || p == 'l',
            None => false,
        };
        if (c == '"' || c == '{') && ends_value {
            out.push(',');
            after_colon = false;
        }
        match c {
            '"' => in_string = true,
            ':' => after_colon = true,
            ',' | '{' | '[' => after_colon = false,
            _ => {}
        }
        previous = Some(c);
        out.push(c);
    }
    out
}

/// Removes commas directly before a closing `}` or `]`.
fn drop_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']') | None) {
                continue;
            }
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

/// Appends closers for brackets left open by truncated output.
fn close_open_brackets(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in text.chars() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    if in_string {
        out.push('"');
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}
