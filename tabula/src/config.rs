//! Table configuration

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::model::{Path, Row};

/// How grow columns share the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutType {
    /// Grow columns split the width left over by fixed columns.
    #[default]
    ByFit,
    /// Every column keeps its intrinsic (header-measured) width.
    ByColumn,
}

/// What a plain click on a row does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectBehavior {
    /// Replace the selection with the clicked row.
    #[default]
    Select,
    /// Flip the clicked row, as if ctrl were held.
    Toggle,
}

/// Pagination flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PagingMode {
    /// Page/size against a known total.
    #[default]
    Offset,
    /// Opaque before/after tokens, total unknown.
    Cursor,
}

/// Who sorts and slices rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSource {
    /// Rows arrive already sorted and paged.
    #[default]
    Server,
    /// The table owns the full row set and sorts/pages it itself.
    Client,
}

/// Derives a group key for a row.
#[derive(Clone)]
pub enum GroupBy {
    /// Stringified value at a dotted path.
    Field(Path),
    /// Arbitrary key function.
    Func(Arc<dyn Fn(&Row) -> String + Send + Sync>),
}

impl GroupBy {
    /// Groups by a field, e.g. `"owner.name"`.
    pub fn field(path: Path) -> Self {
        Self::Field(path)
    }

    /// Groups by the result of `f`.
    pub fn func(f: impl Fn(&Row) -> String + Send + Sync + 'static) -> Self {
        Self::Func(Arc::new(f))
    }

    /// The group key of `row`.
    pub fn key(&self, row: &Row) -> String {
        match self {
            Self::Field(path) => row
                .value(path)
                .map(crate::model::value_to_string)
                .unwrap_or_default(),
            Self::Func(f) => f(row),
        }
    }
}

impl std::fmt::Debug for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(path) => f.debug_tuple("Field").field(path).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Configuration for a table instance.
///
/// # Example
///
/// ```
/// use tabula::config::{PagingMode, TableConfig};
///
/// let config = TableConfig::new("users")
///     .with_paging_mode(PagingMode::Cursor)
///     .with_page_size(50)
///     .with_multi_sort(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Key of the table's persisted state. Required.
    pub table_id: String,

    /// Dotted path yielding each row's ID.
    ///
    /// Default: `"id"`
    pub id_field: String,

    /// Row height in pixels, used for keyboard scroll targets.
    ///
    /// Default: 50
    pub item_size: f64,

    /// Let the last column absorb leftover viewport width.
    pub auto_resize_last_column: bool,

    pub default_layout: LayoutType,

    /// Include the header cell when fitting a column to its content.
    ///
    /// Default: true
    pub dbl_click_resize_include_header: bool,

    /// Keep existing sort keys when another column is sorted.
    pub multi_sort: bool,

    /// Whether rows can be selected at all.
    ///
    /// Default: true
    pub selectable: bool,

    /// Allow ranges and additive selection.
    ///
    /// Default: true
    pub multi_selection: bool,

    pub select_behavior: SelectBehavior,

    /// Never leave the selection empty while rows exist.
    pub force_selection: bool,

    pub group_by: Option<GroupBy>,

    /// Lower bound for columns without their own `min_width`.
    ///
    /// Default: 40
    pub min_cell_width: f64,

    pub expandable_rows: bool,

    /// Allow more than one expanded row.
    ///
    /// Default: true
    pub multi_expandable_rows: bool,

    /// Right-to-left layout; inverts drag-resize direction.
    pub rtl: bool,

    pub paging_mode: PagingMode,

    pub data_source: DataSource,

    /// Show and drive pagination.
    ///
    /// Default: true
    pub paginate: bool,

    /// Initial page size; the first option is used when unset.
    pub page_size: Option<usize>,

    /// Default: `[25, 50, 100]`
    pub page_size_options: Vec<usize>,

    /// Coalescing window for layout and persistence writes.
    ///
    /// Default: 200ms
    pub debounce: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_id: String::new(),
            id_field: "id".to_string(),
            item_size: 50.0,
            auto_resize_last_column: false,
            default_layout: LayoutType::ByFit,
            dbl_click_resize_include_header: true,
            multi_sort: false,
            selectable: true,
            multi_selection: true,
            select_behavior: SelectBehavior::Select,
            force_selection: false,
            group_by: None,
            min_cell_width: 40.0,
            expandable_rows: false,
            multi_expandable_rows: true,
            rtl: false,
            paging_mode: PagingMode::Offset,
            data_source: DataSource::Server,
            paginate: true,
            page_size: None,
            page_size_options: vec![25, 50, 100],
            debounce: Duration::from_millis(200),
        }
    }
}

impl TableConfig {
    /// Creates a config for the given table ID with default values.
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            ..Self::default()
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_item_size(mut self, item_size: f64) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn with_auto_resize_last_column(mut self, enabled: bool) -> Self {
        self.auto_resize_last_column = enabled;
        self
    }

    pub fn with_layout(mut self, layout: LayoutType) -> Self {
        self.default_layout = layout;
        self
    }

    pub fn with_multi_sort(mut self, enabled: bool) -> Self {
        self.multi_sort = enabled;
        self
    }

    pub fn with_selectable(mut self, enabled: bool) -> Self {
        self.selectable = enabled;
        self
    }

    pub fn with_multi_selection(mut self, enabled: bool) -> Self {
        self.multi_selection = enabled;
        self
    }

    pub fn with_select_behavior(mut self, behavior: SelectBehavior) -> Self {
        self.select_behavior = behavior;
        self
    }

    pub fn with_force_selection(mut self, enabled: bool) -> Self {
        self.force_selection = enabled;
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_min_cell_width(mut self, width: f64) -> Self {
        self.min_cell_width = width;
        self
    }

    pub fn with_expandable_rows(mut self, enabled: bool, multi: bool) -> Self {
        self.expandable_rows = enabled;
        self.multi_expandable_rows = multi;
        self
    }

    pub fn with_rtl(mut self, enabled: bool) -> Self {
        self.rtl = enabled;
        self
    }

    pub fn with_paging_mode(mut self, mode: PagingMode) -> Self {
        self.paging_mode = mode;
        self
    }

    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_source = source;
        self
    }

    pub fn with_paginate(mut self, enabled: bool) -> Self {
        self.paginate = enabled;
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The page size used before any is persisted.
    pub fn initial_page_size(&self) -> usize {
        self.page_size
            .or_else(|| self.page_size_options.first().copied())
            .unwrap_or(25)
    }

    /// Checks the configuration.
    ///
    /// A missing table ID is fatal: persisted state cannot be keyed
    /// without it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_id.trim().is_empty() {
            return Err(ConfigError::MissingTableId);
        }
        if self.page_size == Some(0) {
            return Err(ConfigError::InvalidPageSize { size: 0 });
        }
        if let Some(&size) = self.page_size_options.iter().find(|&&size| size == 0) {
            return Err(ConfigError::InvalidPageSize { size });
        }
        if !(self.item_size > 0.0 && self.item_size.is_finite()) {
            return Err(ConfigError::InvalidItemSize {
                size: self.item_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::new("t");
        assert_eq!(config.id_field, "id");
        assert_eq!(config.min_cell_width, 40.0);
        assert_eq!(config.initial_page_size(), 25);
        assert_eq!(config.debounce, Duration::from_millis(200));
        assert!(config.selectable && config.multi_selection);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_table_id_is_rejected() {
        assert_eq!(
            TableConfig::default().validate(),
            Err(ConfigError::MissingTableId)
        );
        assert_eq!(
            TableConfig::new("  ").validate(),
            Err(ConfigError::MissingTableId)
        );
    }

    #[test]
    fn test_invalid_sizes_are_rejected() {
        assert_eq!(
            TableConfig::new("t").with_page_size(0).validate(),
            Err(ConfigError::InvalidPageSize { size: 0 })
        );
        assert!(matches!(
            TableConfig::new("t").with_item_size(0.0).validate(),
            Err(ConfigError::InvalidItemSize { .. })
        ));
    }

    #[test]
    fn test_group_by_field_and_func() {
        let path = Path::parse("team").unwrap();
        let row = Row::with_id(1, json!({"team": "red", "score": 3}));
        assert_eq!(GroupBy::field(path).key(&row), "red");

        let by_score = GroupBy::func(|row: &Row| {
            if row.data["score"].as_i64().unwrap_or(0) > 2 {
                "high".to_string()
            } else {
                "low".to_string()
            }
        });
        assert_eq!(by_score.key(&row), "high");
    }
}
