//! Built-in value comparators and the comparator registry.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::Direction;
use crate::model::value_to_string;

/// Compares two (possibly missing) values in the given direction.
pub type Comparator = Arc<dyn Fn(Option<&Value>, Option<&Value>, Direction) -> Ordering + Send + Sync>;

pub const NUMBER: &str = "number";
pub const STRING: &str = "string";
pub const BOOLEAN: &str = "boolean";
pub const VERSION: &str = "version";

/// Named comparators used by the sort engine.
///
/// Starts with `number`, `string`, `boolean` and `version`; callers may
/// register more or replace the built-ins.
#[derive(Clone)]
pub struct Comparators {
    by_name: HashMap<String, Comparator>,
}

impl Default for Comparators {
    fn default() -> Self {
        let mut comparators = Self {
            by_name: HashMap::new(),
        };
        comparators.register(NUMBER, number);
        comparators.register(STRING, string);
        comparators.register(BOOLEAN, boolean);
        comparators.register(VERSION, version);
        comparators
    }
}

impl std::fmt::Debug for Comparators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("Comparators").field("names", &names).finish()
    }
}

impl Comparators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a comparator, replacing any with the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        compare: impl Fn(Option<&Value>, Option<&Value>, Direction) -> Ordering + Send + Sync + 'static,
    ) {
        self.by_name.insert(name.into(), Arc::new(compare));
    }

    pub fn get(&self, name: &str) -> Option<&Comparator> {
        self.by_name.get(name)
    }

    /// Picks the comparator for a sort key.
    ///
    /// An explicit name wins, else the JSON type of `sample`. Anything
    /// unregistered falls back to string comparison.
    pub fn resolve(&self, explicit: Option<&str>, sample: Option<&Value>) -> Comparator {
        let name = explicit.unwrap_or_else(|| type_name(sample));
        if let Some(found) = self.by_name.get(name) {
            return found.clone();
        }
        log::debug!("No comparator named '{}', using string comparison", name);
        match self.by_name.get(STRING) {
            Some(found) => found.clone(),
            None => Arc::new(string),
        }
    }
}

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        Some(Value::Number(_)) => NUMBER,
        Some(Value::String(_)) => STRING,
        Some(Value::Bool(_)) => BOOLEAN,
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) => "object",
        None => "undefined",
    }
}

fn directed(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// Numeric comparison.
///
/// A negative right operand always orders the left one first; otherwise a
/// negative left operand orders last. Only when neither applies are the
/// parsed values compared. Missing values count as zero.
pub fn number(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let right = b.and_then(as_number);
    let left = a.and_then(as_number).unwrap_or(0.0);
    let ordering = if right.is_some_and(|r| r < 0.0) {
        Ordering::Less
    } else if left < 0.0 {
        Ordering::Greater
    } else {
        left.partial_cmp(&right.unwrap_or(0.0)).unwrap_or(Ordering::Equal)
    };
    directed(ordering, direction)
}

/// Case-insensitive string comparison; missing values compare as `""`.
pub fn string(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let left = a.map(value_to_string).unwrap_or_default().to_lowercase();
    let right = b.map(value_to_string).unwrap_or_default().to_lowercase();
    directed(left.cmp(&right), direction)
}

/// Boolean comparison; `true`, `"true"`, `"True"` and `1` are truthy.
pub fn boolean(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    directed(truthy(a).cmp(&truthy(b)), direction)
}

/// Dotted version comparison over at most three segments.
///
/// Never returns `Equal`: when `a` is not strictly greater than `b` the
/// pair keeps ascending polarity. A missing or empty operand on either side
/// counts as "not greater".
pub fn version(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let greater = is_greater_version(a, b);
    match (direction, greater) {
        (Direction::Asc, true) | (Direction::Desc, false) => Ordering::Greater,
        _ => Ordering::Less,
    }
}

fn is_greater_version(a: Option<&Value>, b: Option<&Value>) -> bool {
    let (Some(a), Some(b)) = (version_text(a), version_text(b)) else {
        return false;
    };
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();
    for i in 0..3 {
        let l = left.get(i).map_or(0, |s| leading_int(s));
        let r = right.get(i).map_or(0, |s| leading_int(s));
        match l.cmp(&r) {
            Ordering::Less => return false,
            Ordering::Greater => return true,
            Ordering::Equal => {}
        }
    }
    false
}

fn version_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(value_to_string(other)),
    }
}

fn truthy(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Bool(true)) => 1,
        Some(Value::String(s)) if s == "true" || s == "True" => 1,
        Some(Value::Number(n)) if n.as_f64() == Some(1.0) => 1,
        _ => 0,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_float(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Parses the longest numeric prefix of `s`, e.g. `"12.5px"` is 12.5.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return None;
    }
    let mantissa_end = end;
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end]
        .parse()
        .ok()
        .or_else(|| s[..mantissa_end].parse().ok())
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn v(value: Value) -> Option<Value> {
        Some(value)
    }

    #[test]
    fn test_number_asymmetry_for_negative_operands() {
        let (three, minus_five) = (v(json!(3)), v(json!(-5)));
        assert_eq!(
            number(three.as_ref(), minus_five.as_ref(), Direction::Asc),
            Ordering::Less
        );
        assert_eq!(
            number(minus_five.as_ref(), three.as_ref(), Direction::Asc),
            Ordering::Greater
        );
        assert_eq!(
            number(three.as_ref(), minus_five.as_ref(), Direction::Desc),
            Ordering::Greater
        );
    }

    #[test]
    fn test_number_parses_strings_and_defaults_missing_to_zero() {
        let (a, b) = (v(json!("10")), v(json!(9.5)));
        assert_eq!(number(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Greater);
        assert_eq!(number(None, b.as_ref(), Direction::Asc), Ordering::Less);
        assert_eq!(number(None, None, Direction::Asc), Ordering::Equal);
        let px = v(json!("12.5px"));
        assert_eq!(as_number(px.as_ref().unwrap()), Some(12.5));
    }

    #[test]
    fn test_string_is_case_insensitive() {
        let (a, b) = (v(json!("apple")), v(json!("Banana")));
        assert_eq!(string(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Less);
        assert_eq!(string(a.as_ref(), b.as_ref(), Direction::Desc), Ordering::Greater);
        let (upper, lower) = (v(json!("ABC")), v(json!("abc")));
        assert_eq!(string(upper.as_ref(), lower.as_ref(), Direction::Asc), Ordering::Equal);
        assert_eq!(string(None, a.as_ref(), Direction::Asc), Ordering::Less);
    }

    #[test]
    fn test_boolean_truthiness() {
        for truthy_value in [json!(true), json!("true"), json!("True"), json!(1)] {
            let f = v(json!(false));
            assert_eq!(
                boolean(Some(&truthy_value), f.as_ref(), Direction::Asc),
                Ordering::Greater
            );
        }
        let (yes, two) = (v(json!("yes")), v(json!(2)));
        assert_eq!(boolean(yes.as_ref(), two.as_ref(), Direction::Asc), Ordering::Equal);
    }

    #[test]
    fn test_version_missing_patch_counts_as_zero() {
        let (a, b) = (v(json!("1.2.3")), v(json!("1.2")));
        assert_eq!(version(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Greater);
        assert_eq!(version(b.as_ref(), a.as_ref(), Direction::Asc), Ordering::Less);
        assert_eq!(version(a.as_ref(), b.as_ref(), Direction::Desc), Ordering::Less);
    }

    #[test]
    fn test_version_never_reports_equal() {
        // Equal versions and missing operands both keep a fixed polarity, so
        // the comparator is not antisymmetric.
        let (a, b) = (v(json!("2.0.0")), v(json!("2.0")));
        assert_eq!(version(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Less);
        assert_eq!(version(b.as_ref(), a.as_ref(), Direction::Asc), Ordering::Less);
        assert_eq!(version(None, a.as_ref(), Direction::Asc), Ordering::Less);
        assert_eq!(version(a.as_ref(), None, Direction::Asc), Ordering::Less);
        assert_eq!(version(a.as_ref(), None, Direction::Desc), Ordering::Greater);
    }

    #[test]
    fn test_version_ignores_fourth_segment() {
        let (a, b) = (v(json!("1.0.0.9")), v(json!("1.0.0.1")));
        assert_eq!(version(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Less);
        let (c, d) = (v(json!("1.10.0")), v(json!("1.9.7")));
        assert_eq!(version(c.as_ref(), d.as_ref(), Direction::Asc), Ordering::Greater);
    }

    #[test]
    fn test_resolve_falls_back_to_string() {
        let comparators = Comparators::new();
        let (a, b) = (v(json!("B")), v(json!("a")));
        let unknown = comparators.resolve(Some("nope"), None);
        assert_eq!(unknown(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Greater);

        let sample = json!({"nested": true});
        let by_type = comparators.resolve(None, Some(&sample));
        assert_eq!(by_type(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Greater);
    }

    #[test]
    fn test_resolve_by_sample_type() {
        let comparators = Comparators::new();
        let (a, b) = (v(json!(10)), v(json!(9)));
        let resolved = comparators.resolve(None, Some(&json!(1)));
        assert_eq!(resolved(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Greater);
        // Strings "10" < "9" lexically.
        let as_string = comparators.resolve(Some(STRING), Some(&json!(1)));
        assert_eq!(as_string(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Less);
    }

    #[test]
    fn test_register_custom_comparator() {
        let mut comparators = Comparators::new();
        comparators.register("length", |a, b, dir| {
            let len = |v: Option<&Value>| v.map(value_to_string).map_or(0, |s| s.len());
            directed(len(a).cmp(&len(b)), dir)
        });
        let (a, b) = (v(json!("zz")), v(json!("aaa")));
        let resolved = comparators.resolve(Some("length"), None);
        assert_eq!(resolved(a.as_ref(), b.as_ref(), Direction::Asc), Ordering::Less);
    }
}
