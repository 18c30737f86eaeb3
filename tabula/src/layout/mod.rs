//! Column-width layout.
//!
//! Widths are distributed in passes:
//!
//! 1. Columns with a custom, explicit or header-measured width take it and
//!    reduce the remaining width.
//! 2. Grow columns split what remains by weight. A column whose share is
//!    below its minimum is pinned to the minimum and the split is repeated
//!    without it.
//! 3. Columns sharing a width group take the group's widest member.
//! 4. Optionally the last column absorbs leftover whitespace.
//!
//! Every width is finally clamped to the column minimum.

mod resize;

pub use resize::{ResizeSession, fit_width};

use std::collections::{BTreeMap, HashMap};

use crate::config::{LayoutType, TableConfig};
use crate::model::Column;

/// Layout settings taken from the table configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub layout: LayoutType,
    pub min_cell_width: f64,
    pub auto_resize_last_column: bool,
}

impl From<&TableConfig> for LayoutOptions {
    fn from(config: &TableConfig) -> Self {
        Self {
            layout: config.default_layout,
            min_cell_width: config.min_cell_width,
            auto_resize_last_column: config.auto_resize_last_column,
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from(&TableConfig::default())
    }
}

/// Computed widths, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub widths: Vec<f64>,
    /// Minimums derived from the header for `min_width_by_header` columns.
    pub header_min_widths: Vec<Option<f64>>,
}

impl Layout {
    pub fn total(&self) -> f64 {
        self.widths.iter().sum()
    }
}

/// Computes column widths for `viewport_width`.
///
/// `custom_widths` holds user-set widths keyed by [`Column::key`].
/// `header_widths` are the rendered header cell widths, one per column.
/// Returns `None` (layout deferred) when the viewport has no width or the
/// header cannot be measured.
pub fn layout(
    columns: &[Column],
    viewport_width: f64,
    custom_widths: &BTreeMap<String, f64>,
    header_widths: Option<&[f64]>,
    options: &LayoutOptions,
) -> Option<Layout> {
    if viewport_width.is_nan() || viewport_width <= 0.0 {
        log::debug!("Layout deferred: viewport width {}", viewport_width);
        return None;
    }
    let Some(header) = header_widths.filter(|h| h.len() == columns.len()) else {
        log::debug!("Layout deferred: header not measurable");
        return None;
    };

    let count = columns.len();
    let mut widths = vec![0.0; count];
    let mut mins = vec![options.min_cell_width; count];
    let mut header_min_widths = vec![None; count];
    let mut custom = vec![false; count];
    let mut pinned = vec![false; count];
    let mut pool = Vec::new();
    let mut remaining = viewport_width;

    for (i, column) in columns.iter().enumerate() {
        let custom_width = custom_widths
            .get(column.key())
            .copied()
            .filter(|w| *w > 0.0);
        let intrinsic = custom_width
            .or(column.width)
            .unwrap_or_else(|| header[i].ceil());

        if column.min_width_by_header && column.min_width.is_none() {
            header_min_widths[i] = Some(intrinsic);
        }
        mins[i] = header_min_widths[i]
            .or(column.min_width)
            .unwrap_or(options.min_cell_width);
        custom[i] = custom_width.is_some();
        widths[i] = intrinsic;

        let grows = column.grow_weight() > 0.0 && !custom[i];
        if grows && options.layout == LayoutType::ByFit {
            pool.push(i);
        } else {
            remaining -= intrinsic;
        }
    }

    distribute(columns, &mut widths, &mins, &mut pinned, pool, remaining);
    apply_width_groups(columns, &mut widths, &custom, &pinned);

    for (width, min) in widths.iter_mut().zip(&mins) {
        *width = width.max(*min);
    }
    if options.auto_resize_last_column {
        grow_last_column(&mut widths, viewport_width);
    }

    log::trace!("Layout for {}px: {:?}", viewport_width, widths);
    Some(Layout {
        widths,
        header_min_widths,
    })
}

/// Splits `remaining` among the grow columns in `pool`, pinning those
/// whose share falls below their minimum until the split is stable.
fn distribute(
    columns: &[Column],
    widths: &mut [f64],
    mins: &[f64],
    pinned: &mut [bool],
    mut pool: Vec<usize>,
    mut remaining: f64,
) {
    while !pool.is_empty() {
        let weight_sum: f64 = pool.iter().map(|&i| columns[i].grow_weight()).sum();
        if weight_sum <= 0.0 {
            return;
        }
        let available = remaining.max(0.0);
        let share = |i: usize| available * columns[i].grow_weight() / weight_sum;

        let (pin, keep): (Vec<usize>, Vec<usize>) =
            pool.iter().partition(|&&i| share(i) < mins[i]);
        if pin.is_empty() {
            for i in keep {
                widths[i] = share(i);
            }
            return;
        }
        for i in pin {
            widths[i] = mins[i];
            pinned[i] = true;
            remaining -= mins[i];
        }
        pool = keep;
    }
}

/// Gives every free member of a width group the group's widest width.
///
/// Members with an explicit or custom width, or pinned to their minimum,
/// neither contribute nor change.
fn apply_width_groups(columns: &[Column], widths: &mut [f64], custom: &[bool], pinned: &[bool]) {
    let free = |i: usize| columns[i].width.is_none() && !custom[i] && !pinned[i];

    let mut group_max: HashMap<&str, f64> = HashMap::new();
    for (i, column) in columns.iter().enumerate() {
        if let Some(group) = column.width_group.as_deref()
            && free(i)
        {
            let max = group_max.entry(group).or_insert(0.0);
            *max = max.max(widths[i]);
        }
    }
    for (i, column) in columns.iter().enumerate() {
        if let Some(group) = column.width_group.as_deref()
            && free(i)
            && let Some(&max) = group_max.get(group)
        {
            widths[i] = max;
        }
    }
}

/// Lets the last column absorb whitespace left in the viewport.
///
/// The new width is floored and never smaller than the current one.
/// Returns `true` if it changed.
pub fn grow_last_column(widths: &mut [f64], viewport_width: f64) -> bool {
    let total: f64 = widths.iter().sum();
    let whitespace = viewport_width - total;
    let Some(last) = widths.last_mut() else {
        return false;
    };
    if whitespace <= 0.0 {
        return false;
    }
    let grown = (*last + whitespace).floor().max(*last);
    let changed = grown != *last;
    *last = grown;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(columns: &[Column], viewport: f64) -> Vec<f64> {
        let header = vec![50.0; columns.len()];
        layout(
            columns,
            viewport,
            &BTreeMap::new(),
            Some(&header),
            &LayoutOptions::default(),
        )
        .map(|l| l.widths)
        .unwrap_or_default()
    }

    #[test]
    fn test_pinning_redistributes_remaining_width() {
        let columns = vec![
            Column::new("a").grow(1.0).min_width(80.0),
            Column::new("b").grow(1.0).min_width(10.0),
        ];
        assert_eq!(run(&columns, 120.0), vec![80.0, 40.0]);
    }

    #[test]
    fn test_fixed_columns_reduce_grow_space() {
        let columns = vec![
            Column::new("id").width(100.0),
            Column::new("name").grow(1.0),
            Column::new("notes").grow(3.0),
        ];
        assert_eq!(run(&columns, 500.0), vec![100.0, 100.0, 300.0]);
    }

    #[test]
    fn test_header_sized_column_uses_measured_width() {
        let columns = vec![Column::new("flag").width_by_header(), Column::new("rest").grow(1.0)];
        let widths = layout(
            &columns,
            300.0,
            &BTreeMap::new(),
            Some(&[64.4, 10.0]),
            &LayoutOptions::default(),
        )
        .unwrap()
        .widths;
        assert_eq!(widths, vec![65.0, 235.0]);
    }

    #[test]
    fn test_custom_width_wins_and_leaves_pool() {
        let columns = vec![Column::new("a").grow(1.0), Column::new("b").grow(1.0)];
        let mut custom = BTreeMap::new();
        custom.insert("a".to_string(), 150.0);
        let widths = layout(
            &columns,
            400.0,
            &custom,
            Some(&[50.0, 50.0]),
            &LayoutOptions::default(),
        )
        .unwrap()
        .widths;
        assert_eq!(widths, vec![150.0, 250.0]);
    }

    #[test]
    fn test_width_group_takes_widest_member() {
        let columns = vec![
            Column::new("a").grow(1.0).width_group("g"),
            Column::new("b").grow(3.0).width_group("g"),
            Column::new("c").width(100.0).width_group("g"),
        ];
        let widths = run(&columns, 500.0);
        assert_eq!(widths, vec![300.0, 300.0, 100.0]);
    }

    #[test]
    fn test_minimum_is_enforced() {
        let columns = vec![Column::new("a").width(10.0), Column::new("b").width(5.0).min_width(30.0)];
        assert_eq!(run(&columns, 100.0), vec![40.0, 30.0]);
    }

    #[test]
    fn test_by_column_keeps_intrinsic_widths() {
        let options = LayoutOptions {
            layout: LayoutType::ByColumn,
            ..LayoutOptions::default()
        };
        let columns = vec![Column::new("a").grow(1.0), Column::new("b").grow(1.0)];
        let widths = layout(&columns, 1000.0, &BTreeMap::new(), Some(&[70.0, 90.0]), &options)
            .unwrap()
            .widths;
        assert_eq!(widths, vec![70.0, 90.0]);
    }

    #[test]
    fn test_auto_grow_last_column() {
        let options = LayoutOptions {
            auto_resize_last_column: true,
            ..LayoutOptions::default()
        };
        let columns = vec![Column::new("a").width(100.0), Column::new("b").width(100.0)];
        let widths = layout(&columns, 350.5, &BTreeMap::new(), Some(&[0.0, 0.0]), &options)
            .unwrap()
            .widths;
        assert_eq!(widths, vec![100.0, 250.0]);
    }

    #[test]
    fn test_min_width_by_header() {
        let columns = vec![Column::new("a").grow(1.0).min_width_by_header(), Column::new("b").grow(1.0)];
        let result = layout(
            &columns,
            200.0,
            &BTreeMap::new(),
            Some(&[120.0, 50.0]),
            &LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(result.header_min_widths, vec![Some(120.0), None]);
        assert_eq!(result.widths, vec![120.0, 80.0]);
    }

    #[test]
    fn test_degenerate_geometry_defers() {
        let columns = vec![Column::new("a")];
        let options = LayoutOptions::default();
        assert!(layout(&columns, 0.0, &BTreeMap::new(), Some(&[10.0]), &options).is_none());
        assert!(layout(&columns, -5.0, &BTreeMap::new(), Some(&[10.0]), &options).is_none());
        assert!(layout(&columns, 100.0, &BTreeMap::new(), None, &options).is_none());
        assert!(layout(&columns, 100.0, &BTreeMap::new(), Some(&[]), &options).is_none());
    }

    #[test]
    fn test_grow_last_column_never_shrinks() {
        let mut widths = vec![50.0, 33.5];
        assert!(!grow_last_column(&mut widths, 83.75));
        assert_eq!(widths[1], 33.5);
        assert!(grow_last_column(&mut widths, 200.0));
        assert_eq!(widths[1], 150.0);
        assert!(!grow_last_column(&mut [], 100.0));
    }
}
