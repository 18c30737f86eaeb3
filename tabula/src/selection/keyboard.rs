//! Keyboard row navigation and keeping the target row in view.

use crate::model::RowId;
use crate::viewport::{ScrollMetrics, ScrollRequest};

use super::Selection;

/// Vertical navigation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
}

impl NavKey {
    /// Maps a key code (`ArrowDown`, `KeyS`, `ArrowUp`, `KeyW`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowDown" | "KeyS" => Some(Self::Down),
            "ArrowUp" | "KeyW" => Some(Self::Up),
            _ => None,
        }
    }
}

/// Render index the next keyboard step lands on.
///
/// Moving down goes to just past the last selected row while the anchor
/// sits at or before the first selected row, else to just past the first.
/// Moving up mirrors that. With nothing selected, down starts at the top
/// and up at the bottom. Returns `None` when the step leaves the sequence.
pub fn next_index(selection: &Selection, sequence: &[Option<RowId>], key: NavKey) -> Option<usize> {
    let Some((first, last)) = selection.bounds(sequence) else {
        return match key {
            NavKey::Down => (!sequence.is_empty()).then_some(0),
            NavKey::Up => sequence.len().checked_sub(1),
        };
    };
    let (first, last) = (first as isize, last as isize);
    let anchor = selection
        .anchor_index(sequence)
        .map_or(-1, |index| index as isize);

    let next = match key {
        NavKey::Down if anchor > first => first + 1,
        NavKey::Down => last + 1,
        NavKey::Up if anchor < last => last - 1,
        NavKey::Up => first - 1,
    };
    usize::try_from(next)
        .ok()
        .filter(|&index| index < sequence.len())
}

/// Scroll needed to bring `row_index` into view, if any.
///
/// Rows at or above the first visible index are scrolled to directly.
/// Rows below the viewport get a pixel offset that places them just inside
/// its bottom edge, using the rendered item size.
pub fn scroll_target(row_index: usize, metrics: &ScrollMetrics, item_size: f64) -> Option<ScrollRequest> {
    let start = metrics.visible.start;
    if row_index <= start {
        return Some(ScrollRequest::ToIndex(row_index));
    }

    let rows_in_viewport = (metrics.viewport_height / item_size).ceil().max(0.0) as usize;
    if row_index - start < rows_in_viewport {
        return None;
    }

    let rendered = metrics.visible.end.saturating_sub(start);
    let measured = metrics.rendered_content_size / rendered as f64;
    let item = if rendered > 0 && measured.is_finite() && measured > 0.0 {
        measured
    } else {
        item_size
    };

    let bottom = metrics.scroll_top + metrics.viewport_height;
    let last_out = item - bottom % item;
    let rows_out = (row_index - start - rows_in_viewport) as f64;
    let first_item = if metrics.scroll_top > 0.0 { 0.0 } else { item };

    Some(ScrollRequest::ToOffset(
        metrics.scroll_top + first_item + rows_out * item + last_out + 1.0,
    ))
}
