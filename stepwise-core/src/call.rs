use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{StepwiseError, Value};

/// Surface syntax a call (and its observation) is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArgumentFormat {
    /// Call-expression form: `Search("query", limit=3)`.
    #[default]
    Python,
    /// Name followed by a JSON object of keyword arguments:
    /// `Search {"query": "..."}`.
    Json,
}

/// A structured tool-call request: name plus positional and keyword args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_call(self, ArgumentFormat::Python))
    }
}

/// Extracts the leading call expression from `text`.
///
/// Accepts `Name(arg, key=value, ...)` with JSON-style literals (single
/// quotes tolerated) and `Name {json object}` for keyword-only calls. Any
/// text after the closing delimiter is ignored, since model replies often
/// keep going. Malformed input yields [`StepwiseError::ParseFailed`].
pub fn parse_call(text: &str) -> Result<(FunctionCall, ArgumentFormat), StepwiseError> {
    let trimmed = text.trim_start();
    let name_len = ident_len(trimmed);
    if name_len == 0 {
        return Err(parse_failed(text, "expected a call name"));
    }
    let name = trimmed[..name_len].to_string();
    let rest = trimmed[name_len..].trim_start();

    if rest.starts_with('(') {
        let close = matching_close(rest, '(', ')')
            .ok_or_else(|| parse_failed(text, "unbalanced parentheses in call arguments"))?;
        let inner = &rest[1..close];
        let mut call = FunctionCall::new(name);
        if !inner.trim().is_empty() {
            for part in split_top_level(inner) {
                if part.trim().is_empty() {
                    return Err(parse_failed(text, "empty argument in call"));
                }
                match split_kwarg(part) {
                    Some((key, raw)) => {
                        call.kwargs.insert(key.to_string(), parse_literal(text, raw)?);
                    }
                    None => call.args.push(parse_literal(text, part)?),
                }
            }
        }
        Ok((call, ArgumentFormat::Python))
    } else if rest.starts_with('{') {
        let close = matching_close(rest, '{', '}')
            .ok_or_else(|| parse_failed(text, "unbalanced braces in call arguments"))?;
        let object: Value = serde_json::from_str(&rest[..=close])
            .map_err(|e| parse_failed(text, &format!("invalid argument object: {e}")))?;
        let Value::Object(entries) = object else {
            return Err(parse_failed(text, "argument object must be a JSON object"));
        };
        let mut call = FunctionCall::new(name);
        call.kwargs = entries.into_iter().collect();
        Ok((call, ArgumentFormat::Json))
    } else {
        Err(parse_failed(text, "expected '(' or '{' after call name"))
    }
}

/// Renders a call back into the given surface syntax.
///
/// A call with positional arguments has no JSON-object form and falls back
/// to the call-expression rendering.
pub fn render_call(call: &FunctionCall, fmt: ArgumentFormat) -> String {
    match fmt {
        ArgumentFormat::Json if call.args.is_empty() => {
            let object: serde_json::Map<String, Value> = call
                .kwargs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            format!("{} {}", call.name, Value::Object(object))
        }
        _ => {
            let mut parts: Vec<String> = call.args.iter().map(Value::to_string).collect();
            parts.extend(call.kwargs.iter().map(|(k, v)| format!("{k}={v}")));
            format!("{}({})", call.name, parts.join(", "))
        }
    }
}

/// Renders an observation value back into display text for the same format.
/// Strings render bare except under the JSON format.
pub fn render_response(fmt: Option<ArgumentFormat>, value: &Value) -> String {
    match (fmt, value) {
        (Some(ArgumentFormat::Json), v) => v.to_string(),
        (_, Value::String(s)) => s.clone(),
        (_, v) => v.to_string(),
    }
}

fn parse_failed(output: &str, reason: &str) -> StepwiseError {
    StepwiseError::ParseFailed {
        output: output.trim().to_string(),
        reason: reason.to_string(),
    }
}

fn ident_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let valid = if i == 0 {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || c == '_'
        };
        if !valid {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && ident_len(s) == s.len()
}

/// Byte index of the delimiter matching `s[0] == open`, honoring quoted
/// strings and backslash escapes.
fn matching_close(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_quote = None;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            in_quote = Some(c);
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Splits on commas at bracket depth zero, outside quotes.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        if let Some(q) = in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Splits `key=value` at a top-level `=` (not `==`) when the left side is
/// an identifier; returns `None` for positional arguments.
fn split_kwarg(part: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in part.char_indices() {
        if let Some(q) = in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                if part[i + 1..].starts_with('=') {
                    return None;
                }
                let key = part[..i].trim();
                if !is_ident(key) {
                    return None;
                }
                return Some((key, &part[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

fn parse_literal(original: &str, raw: &str) -> Result<Value, StepwiseError> {
    let raw = raw.trim();
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }
    // Single-quoted strings are common in model output; normalize them.
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        let inner = &raw[1..raw.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut escaped = false;
        for c in inner.chars() {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else {
                out.push(c);
            }
        }
        if !escaped {
            return Ok(Value::String(out));
        }
    }
    Err(parse_failed(
        original,
        &format!("unsupported argument literal: {raw}"),
    ))
}
