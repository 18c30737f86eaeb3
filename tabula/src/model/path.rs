//! Dotted-path evaluation over JSON records.

use serde_json::Value;

use crate::error::PathError;

/// A parsed dotted-path expression such as `"owner.address.city"` or
/// `"tags[0].name"`.
///
/// Object segments are looked up by key, array segments by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    /// Parses a path expression.
    ///
    /// Bracket indices are rewritten to dotted segments and a single leading
    /// dot is ignored, so `"a[1].b"`, `".a.1.b"` and `"a.1.b"` are equivalent.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        let normalized = normalize(expr);
        if normalized.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, segment) in normalized.split('.').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: expr.to_string(),
                    position,
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: expr.to_string(),
            segments,
        })
    }

    /// Returns the expression this path was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks `value` along this path.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| step(current, segment))
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Evaluates a path expression without keeping the parsed form.
///
/// Malformed expressions resolve to `None`; empty segments are skipped.
pub fn by_string<'a>(value: &'a Value, expr: &str) -> Option<&'a Value> {
    let normalized = normalize(expr);
    if normalized.is_empty() {
        return None;
    }
    normalized
        .split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, step)
}

/// Renders a scalar the way it reads in a cell.
///
/// Strings are returned as-is, `null` becomes the empty string and
/// composite values fall back to their JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn normalize(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    for ch in expr.trim().chars() {
        match ch {
            '[' => out.push('.'),
            ']' => {}
            c => out.push(c),
        }
    }
    match out.strip_prefix('.') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}
