#![allow(dead_code)]

use std::ops::Range;

use serde_json::{Value, json};
use tabula::viewport::{Axis, ColumnMeasure, Edge, ScrollRequest, Viewport};

/// Viewport double recording every scroll request.
pub struct FakeViewport {
    pub visible: Range<usize>,
    pub height: f64,
    pub item: f64,
    pub scroll_top: f64,
    pub requests: Vec<ScrollRequest>,
}

impl FakeViewport {
    pub fn new(visible: Range<usize>, height: f64, item: f64) -> Self {
        Self {
            visible,
            height,
            item,
            scroll_top: 0.0,
            requests: Vec::new(),
        }
    }
}

impl Viewport for FakeViewport {
    fn visible_range(&self) -> Range<usize> {
        self.visible.clone()
    }

    fn viewport_size(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => 0.0,
        }
    }

    fn rendered_content_size(&self) -> f64 {
        self.visible.len() as f64 * self.item
    }

    fn scroll_offset(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.scroll_top,
            _ => 0.0,
        }
    }

    fn scroll_to_index(&mut self, index: usize) {
        self.requests.push(ScrollRequest::ToIndex(index));
    }

    fn scroll_to_offset(&mut self, offset: f64) {
        self.scroll_top = offset;
        self.requests.push(ScrollRequest::ToOffset(offset));
    }
}

/// Header measurement double with fixed widths.
pub struct FakeHeader {
    pub widths: Option<Vec<f64>>,
    pub cells: Vec<f64>,
}

impl FakeHeader {
    pub fn uniform(count: usize, width: f64) -> Self {
        Self {
            widths: Some(vec![width; count]),
            cells: Vec::new(),
        }
    }

    pub fn unmeasurable() -> Self {
        Self {
            widths: None,
            cells: Vec::new(),
        }
    }
}

impl ColumnMeasure for FakeHeader {
    fn header_widths(&self) -> Option<Vec<f64>> {
        self.widths.clone()
    }

    fn natural_header_width(&self, column: usize) -> f64 {
        self.widths
            .as_ref()
            .and_then(|w| w.get(column).copied())
            .unwrap_or(0.0)
    }

    fn natural_cell_widths(&self, _column: usize) -> Vec<f64> {
        self.cells.clone()
    }
}

/// Tiny deterministic generator for property-style loops.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

/// `n` people records with ids `1..=n`.
pub fn people(n: i64) -> Vec<Value> {
    let teams = ["red", "blue", "green"];
    (1..=n)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Person {:02}", (i * 7) % 13),
                "age": (i * 17) % 50,
                "active": i % 3 == 0,
                "team": teams[(i as usize) % teams.len()],
                "profile": { "city": if i % 2 == 0 { "Oslo" } else { "Lima" } },
            })
        })
        .collect()
}
