//! Interfaces to the virtualized viewport and the rendered header.
//!
//! The engine never renders. It asks the host for geometry through these
//! traits and hands scroll requests back.

use std::ops::Range;

/// Measurement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Edge a scroll offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// The virtualization primitive that renders a window of rows.
pub trait Viewport {
    /// Render-sequence indices currently materialized.
    fn visible_range(&self) -> Range<usize>;

    /// Size of the visible viewport along `axis`, in pixels.
    fn viewport_size(&self, axis: Axis) -> f64;

    /// Total size of the rendered rows, in pixels.
    fn rendered_content_size(&self) -> f64;

    fn scroll_offset(&self, edge: Edge) -> f64;

    fn scroll_to_index(&mut self, index: usize);

    fn scroll_to_offset(&mut self, offset: f64);
}

/// Measurements of the rendered header and cells.
pub trait ColumnMeasure {
    /// Current rendered width of each header cell, in column order.
    ///
    /// `None` while the header is not laid out.
    fn header_widths(&self) -> Option<Vec<f64>>;

    /// Unconstrained width of a header cell's content.
    fn natural_header_width(&self, column: usize) -> f64;

    /// Unconstrained content widths of `column` across the rendered rows.
    ///
    /// Cells spanning several columns are left out.
    fn natural_cell_widths(&self, column: usize) -> Vec<f64>;
}

/// A scroll adjustment requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollRequest {
    ToIndex(usize),
    ToOffset(f64),
}

impl ScrollRequest {
    pub fn apply(self, viewport: &mut dyn Viewport) {
        match self {
            Self::ToIndex(index) => viewport.scroll_to_index(index),
            Self::ToOffset(offset) => viewport.scroll_to_offset(offset),
        }
    }
}

/// Snapshot of the viewport geometry needed to place a row in view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollMetrics {
    pub visible: Range<usize>,
    pub viewport_height: f64,
    pub rendered_content_size: f64,
    pub scroll_top: f64,
}

impl ScrollMetrics {
    pub fn capture(viewport: &dyn Viewport) -> Self {
        Self {
            visible: viewport.visible_range(),
            viewport_height: viewport.viewport_size(Axis::Vertical),
            rendered_content_size: viewport.rendered_content_size(),
            scroll_top: viewport.scroll_offset(Edge::Top),
        }
    }
}
