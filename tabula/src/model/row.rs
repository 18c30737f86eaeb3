//! Row identity and row snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::Path;

/// Stable identifier of a row, derived from its record.
///
/// Selection, anchors and row expansion are keyed by this ID so they survive
/// row-set replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RowId {
    Number(i64),
    Text(String),
}

impl RowId {
    /// Derives an ID from a JSON value.
    ///
    /// Integers keep their numeric identity; other scalars are rendered as
    /// text. `null`, empty strings and composite values yield no ID.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => RowId::Number(i),
                None => RowId::Text(n.to_string()),
            }),
            Value::String(s) if !s.is_empty() => Some(RowId::Text(s.clone())),
            Value::Bool(b) => Some(RowId::Text(b.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::Number(n) => write!(f, "{}", n),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        RowId::Number(v)
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        RowId::Text(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        RowId::Text(v)
    }
}

/// One row of the table: its ID and the opaque record it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// `None` when the ID path does not resolve to a usable scalar.
    pub id: Option<RowId>,
    pub data: Value,
}

impl Row {
    /// Builds a row, deriving its ID by evaluating `id_path` on the record.
    pub fn new(id_path: &Path, data: Value) -> Self {
        let id = id_path.resolve(&data).and_then(RowId::from_value);
        Self { id, data }
    }

    /// Builds a row with an explicit ID.
    pub fn with_id(id: impl Into<RowId>, data: Value) -> Self {
        Self {
            id: Some(id.into()),
            data,
        }
    }

    /// Looks up a field of the record.
    pub fn value(&self, path: &Path) -> Option<&Value> {
        path.resolve(&self.data)
    }
}

/// Converts raw records into rows.
pub fn rows_from_records(records: Vec<Value>, id_path: &Path) -> Vec<Row> {
    records
        .into_iter()
        .map(|record| Row::new(id_path, record))
        .collect()
}
