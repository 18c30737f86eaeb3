//! Column definitions and width constraints.

use std::collections::BTreeMap;

/// Column configuration.
///
/// Columns declare how their width is derived: an explicit width, a grow
/// weight competing for leftover viewport width, or the measured width of
/// their header. `computed_width` is written by the layout engine and never
/// drops below the column's minimum.
///
/// # Examples
///
/// ```
/// use tabula::model::Column;
///
/// let columns = vec![
///     Column::new("id").width(80.0),
///     Column::new("name").grow(2.0).min_width(120.0),
///     Column::new("status").width_group("flags"),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Record field shown in this column (dotted path).
    pub field: String,
    /// Header text.
    pub title: Option<String>,
    /// Explicit width in pixels.
    pub width: Option<f64>,
    /// Lower bound for the computed width.
    pub min_width: Option<f64>,
    /// Claim on leftover viewport width.
    pub width_grow: Option<f64>,
    /// Columns in the same group share one uniform width.
    pub width_group: Option<String>,
    /// Size the column by its header instead of growing.
    pub width_by_header: bool,
    /// Use the measured header width as `min_width` when none is set.
    pub min_width_by_header: bool,
    /// Comparator name used when sorting by this column.
    pub sorter: Option<String>,
    /// Field name reported to the data source for sorting.
    pub sort_field: Option<String>,
    pub sortable: bool,
    pub active: bool,
    pub visible: bool,
    pub resizable: bool,
    /// Width assigned by the layout engine.
    pub computed_width: Option<f64>,
}

impl Column {
    /// Create a column bound to a record field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: None,
            width: None,
            min_width: None,
            width_grow: None,
            width_group: None,
            width_by_header: false,
            min_width_by_header: false,
            sorter: None,
            sort_field: None,
            sortable: true,
            active: true,
            visible: true,
            resizable: true,
            computed_width: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn min_width(mut self, min_width: f64) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn grow(mut self, weight: f64) -> Self {
        self.width_grow = Some(weight);
        self
    }

    pub fn width_group(mut self, group: impl Into<String>) -> Self {
        self.width_group = Some(group.into());
        self
    }

    pub fn width_by_header(mut self) -> Self {
        self.width_by_header = true;
        self
    }

    pub fn min_width_by_header(mut self) -> Self {
        self.min_width_by_header = true;
        self
    }

    pub fn sorter(mut self, sorter: impl Into<String>) -> Self {
        self.sorter = Some(sorter.into());
        self
    }

    pub fn sort_field(mut self, sort_field: impl Into<String>) -> Self {
        self.sort_field = Some(sort_field.into());
        self
    }

    pub fn disable_sort(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.resizable = false;
        self
    }

    /// Key under which custom widths and visibility are persisted.
    pub fn key(&self) -> &str {
        match &self.title {
            Some(title) if self.field.is_empty() => title,
            _ => &self.field,
        }
    }

    /// Grow weight after normalisation; zero means "not a grow column".
    pub fn grow_weight(&self) -> f64 {
        self.width_grow.unwrap_or(0.0).max(0.0)
    }

    /// The minimum this column's computed width may take.
    pub fn effective_min_width(&self, min_cell_width: f64) -> f64 {
        self.min_width.unwrap_or(min_cell_width)
    }

    /// Stores a computed width, clamped to the column minimum.
    ///
    /// Returns `true` if the stored width changed. Non-positive widths are
    /// ignored.
    pub fn set_computed_width(&mut self, width: f64, min_cell_width: f64) -> bool {
        if width <= 0.0 || !width.is_finite() {
            return false;
        }
        let width = width.max(self.effective_min_width(min_cell_width));
        if self.computed_width == Some(width) {
            return false;
        }
        self.computed_width = Some(width);
        true
    }
}

/// Applies column defaults and drops columns that should not be shown.
///
/// Columns without an explicit width and not sized by header default to a
/// grow weight of 1; explicit or header-sized columns default to 0. Inactive
/// columns are dropped. Visibility comes from `visibility` (keyed by column
/// key) when the map is non-empty, else from each column's own flag.
pub fn normalize_columns(columns: Vec<Column>, visibility: &BTreeMap<String, bool>) -> Vec<Column> {
    columns
        .into_iter()
        .filter(|column| column.active)
        .map(|mut column| {
            if column.width_grow.is_none() {
                let fixed = column.width.is_some() || column.width_by_header;
                column.width_grow = Some(if fixed { 0.0 } else { 1.0 });
            }
            column
        })
        .filter(|column| {
            if visibility.is_empty() {
                column.visible
            } else {
                visibility.get(column.key()).copied() != Some(false)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults_grow_weight() {
        let columns = normalize_columns(
            vec![
                Column::new("a"),
                Column::new("b").width(50.0),
                Column::new("c").width_by_header(),
                Column::new("d").grow(3.0),
            ],
            &BTreeMap::new(),
        );
        let weights: Vec<f64> = columns.iter().map(Column::grow_weight).collect();
        assert_eq!(weights, vec![1.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_normalize_drops_inactive_and_hidden() {
        let columns = normalize_columns(
            vec![Column::new("a").inactive(), Column::new("b").hidden(), Column::new("c")],
            &BTreeMap::new(),
        );
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].field, "c");
    }

    #[test]
    fn test_visibility_map_overrides_column_flag() {
        let mut visibility = BTreeMap::new();
        visibility.insert("b".to_string(), true);
        visibility.insert("c".to_string(), false);
        let columns = normalize_columns(
            vec![Column::new("a"), Column::new("b").hidden(), Column::new("c")],
            &visibility,
        );
        let fields: Vec<&str> = columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_computed_width_respects_minimum() {
        let mut column = Column::new("a").min_width(60.0);
        assert!(column.set_computed_width(20.0, 40.0));
        assert_eq!(column.computed_width, Some(60.0));
        assert!(!column.set_computed_width(0.0, 40.0));
        assert!(!column.set_computed_width(60.0, 40.0));

        let mut plain = Column::new("b");
        plain.set_computed_width(10.0, 40.0);
        assert_eq!(plain.computed_width, Some(40.0));
    }

    #[test]
    fn test_key_falls_back_to_title() {
        assert_eq!(Column::new("").title("Name").key(), "Name");
        assert_eq!(Column::new("name").title("Name").key(), "name");
    }
}
