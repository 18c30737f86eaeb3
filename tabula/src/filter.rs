//! Per-column text filters.

use std::collections::BTreeMap;

use crate::model::{Row, by_string, value_to_string};

/// Case-insensitive substring filters keyed by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    queries: BTreeMap<String, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query for `field`; an empty query removes the filter.
    ///
    /// Returns `true` if the filters changed.
    pub fn set(&mut self, field: impl Into<String>, query: &str) -> bool {
        let field = field.into();
        if query.is_empty() {
            return self.queries.remove(&field).is_some();
        }
        let query = query.to_lowercase();
        if self.queries.get(&field) == Some(&query) {
            return false;
        }
        self.queries.insert(field, query);
        true
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.queries.get(field).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.queries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Whether `row` passes every filter. Rows missing a filtered field fail.
    pub fn matches(&self, row: &Row) -> bool {
        self.queries.iter().all(|(field, query)| {
            by_string(&row.data, field)
                .filter(|value| !value.is_null())
                .is_some_and(|value| value_to_string(value).to_lowercase().contains(query))
        })
    }

    /// Keeps the rows passing every filter.
    pub fn apply(&self, rows: Vec<Row>) -> Vec<Row> {
        if self.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}
