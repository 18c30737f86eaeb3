//! Multi-key sorting of rows.
//!
//! A [`SortSpec`] is an ordered list of keys, primary first. [`sort`] runs a
//! single comparator chain over the rows, evaluating keys in order until one
//! of them tells the pair apart.

mod comparators;
mod merge;

pub use comparators::{BOOLEAN, Comparator, Comparators, NUMBER, STRING, VERSION};
pub use comparators::{boolean, number, string, version};

use serde::{Deserialize, Serialize};

use crate::model::{Column, Row, by_string};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// One key of a sort specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortEntry {
    /// Dotted path of the sorted value.
    pub field: String,
    pub direction: Direction,
    /// Comparator name; detected from the data when unset.
    pub sorter: Option<String>,
    /// Name reported to the data source instead of `field`.
    pub sort_field: Option<String>,
}

impl SortEntry {
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
            sorter: None,
            sort_field: None,
        }
    }

    pub fn with_sorter(mut self, sorter: impl Into<String>) -> Self {
        self.sorter = Some(sorter.into());
        self
    }

    pub fn with_sort_field(mut self, sort_field: impl Into<String>) -> Self {
        self.sort_field = Some(sort_field.into());
        self
    }

    /// The field name to report outward.
    pub fn reported_field(&self) -> &str {
        self.sort_field.as_deref().unwrap_or(&self.field)
    }
}

/// Ordered sort keys, primary first; at most one entry per field.
///
/// # Example
///
/// ```
/// use tabula::sort::{SortEntry, SortSpec};
///
/// let spec = SortSpec::from(vec![SortEntry::desc("revenue"), SortEntry::asc("name")]);
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    entries: Vec<SortEntry>,
}

impl From<Vec<SortEntry>> for SortSpec {
    fn from(entries: Vec<SortEntry>) -> Self {
        let mut spec = Self::default();
        for entry in entries {
            spec.push(entry);
        }
        spec
    }
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends a key, replacing any existing entry for the same field.
    pub fn push(&mut self, entry: SortEntry) {
        match self.position(&entry.field) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Index of the entry for `field`.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.field == field)
    }

    /// Direction and 1-based precedence of `field`, if sorted.
    pub fn order_of(&self, field: &str) -> Option<(Direction, usize)> {
        self.position(field)
            .map(|index| (self.entries[index].direction, index + 1))
    }

    /// Cycles a column through ascending, descending and unsorted.
    ///
    /// Without `multi_sort` every other key is dropped first. Returns the
    /// column's new direction.
    pub fn toggle(&mut self, column: &Column, multi_sort: bool) -> Option<Direction> {
        let existing = self
            .position(&column.field)
            .map(|index| (index, self.entries[index].direction));
        if !multi_sort {
            self.entries.clear();
        }

        let mut entry = SortEntry::asc(column.field.clone());
        entry.sorter = column.sorter.clone();
        entry.sort_field = column.sort_field.clone();

        match existing {
            None => {
                self.entries.push(entry);
                Some(Direction::Asc)
            }
            Some((index, Direction::Asc)) => {
                entry.direction = Direction::Desc;
                if index < self.entries.len() {
                    self.entries[index] = entry;
                } else {
                    self.entries.push(entry);
                }
                Some(Direction::Desc)
            }
            Some((index, Direction::Desc)) => {
                if index < self.entries.len() {
                    self.entries.remove(index);
                }
                None
            }
        }
    }
}

/// Sorts rows by `spec`.
///
/// Empty specs and empty row sets are returned unchanged. Comparators are
/// resolved once per key, using the first row's value when the entry names
/// none. Ties keep their input order.
pub fn sort(rows: Vec<Row>, spec: &SortSpec, comparators: &Comparators) -> Vec<Row> {
    if spec.is_empty() || rows.is_empty() {
        return rows;
    }

    let keys: Vec<(&SortEntry, Comparator)> = spec
        .entries()
        .iter()
        .map(|entry| {
            let sample = by_string(&rows[0].data, &entry.field);
            (entry, comparators.resolve(entry.sorter.as_deref(), sample))
        })
        .collect();

    log::trace!("Sorting {} rows by {} keys", rows.len(), keys.len());

    merge::stable_sort_by(rows, &mut |a: &Row, b: &Row| {
        for (entry, compare) in &keys {
            let ordering = compare(
                by_string(&a.data, &entry.field),
                by_string(&b.data, &entry.field),
                entry.direction,
            );
            if ordering.is_ne() {
                return ordering;
            }
        }
        std::cmp::Ordering::Equal
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::RowId;

    fn rows(values: Vec<serde_json::Value>) -> Vec<Row> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Row::with_id(i as i64, v))
            .collect()
    }

    fn ids(rows: &[Row]) -> Vec<RowId> {
        rows.iter().filter_map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_empty_spec_is_noop() {
        let input = rows(vec![json!({"a": 2}), json!({"a": 1})]);
        let sorted = sort(input.clone(), &SortSpec::new(), &Comparators::new());
        assert_eq!(sorted, input);
    }

    #[test]
    fn test_primary_key_first() {
        let input = rows(vec![
            json!({"team": "b", "score": 1}),
            json!({"team": "a", "score": 1}),
            json!({"team": "a", "score": 5}),
            json!({"team": "b", "score": 3}),
        ]);
        let spec = SortSpec::from(vec![SortEntry::desc("score"), SortEntry::asc("team")]);
        let sorted = sort(input, &spec, &Comparators::new());
        assert_eq!(
            ids(&sorted),
            vec![RowId::from(2), RowId::from(3), RowId::from(1), RowId::from(0)]
        );
    }

    #[test]
    fn test_nested_field_and_explicit_sorter() {
        let input = rows(vec![
            json!({"pkg": {"v": "1.10.0"}}),
            json!({"pkg": {"v": "1.9.0"}}),
            json!({"pkg": {"v": "1.2.3"}}),
        ]);
        let spec = SortSpec::from(vec![SortEntry::asc("pkg.v").with_sorter(VERSION)]);
        let sorted = sort(input, &spec, &Comparators::new());
        assert_eq!(
            ids(&sorted),
            vec![RowId::from(2), RowId::from(1), RowId::from(0)]
        );
    }

    #[test]
    fn test_toggle_cycles_directions() {
        let column = Column::new("name").sort_field("full_name");
        let mut spec = SortSpec::new();
        assert_eq!(spec.toggle(&column, false), Some(Direction::Asc));
        assert_eq!(spec.entries()[0].reported_field(), "full_name");
        assert_eq!(spec.toggle(&column, false), Some(Direction::Desc));
        assert_eq!(spec.toggle(&column, false), None);
        assert!(spec.is_empty());
    }

    #[test]
    fn test_toggle_single_sort_replaces_other_keys() {
        let mut spec = SortSpec::from(vec![SortEntry::asc("a")]);
        spec.toggle(&Column::new("b"), false);
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.entries()[0].field, "b");
    }

    #[test]
    fn test_toggle_multi_sort_keeps_precedence() {
        let mut spec = SortSpec::from(vec![SortEntry::asc("a"), SortEntry::asc("b")]);
        spec.toggle(&Column::new("a"), true);
        assert_eq!(spec.order_of("a"), Some((Direction::Desc, 1)));
        assert_eq!(spec.order_of("b"), Some((Direction::Asc, 2)));
        spec.toggle(&Column::new("a"), true);
        assert_eq!(spec.order_of("a"), None);
        assert_eq!(spec.order_of("b"), Some((Direction::Asc, 1)));
    }

    #[test]
    fn test_push_deduplicates_fields() {
        let spec = SortSpec::from(vec![SortEntry::asc("a"), SortEntry::desc("a")]);
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.entries()[0].direction, Direction::Desc);
    }
}
