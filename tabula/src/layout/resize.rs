//! Manual column resizing.

/// An in-progress drag on a column's resize handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    column: usize,
    origin_x: f64,
    original_width: f64,
    width: f64,
    direction: f64,
}

impl ResizeSession {
    /// Starts a drag at pointer position `origin_x` on a column currently
    /// `original_width` wide. In right-to-left tables the drag direction
    /// is inverted.
    pub fn begin(column: usize, origin_x: f64, original_width: f64, rtl: bool) -> Self {
        Self {
            column,
            origin_x,
            original_width,
            width: original_width,
            direction: if rtl { -1.0 } else { 1.0 },
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Follows the pointer, keeping the width at or above `min_width`.
    pub fn drag(&mut self, pointer_x: f64, min_width: f64) -> f64 {
        let delta = (pointer_x - self.origin_x) * self.direction;
        self.width = (self.original_width + delta).max(min_width);
        self.width
    }

    /// Whether the drag moved the column edge.
    pub fn changed(&self) -> bool {
        self.width != self.original_width
    }
}

/// Width that fits a column's content: the widest natural cell width,
/// including the header when given, rounded up. `None` if nothing has width.
pub fn fit_width(header: Option<f64>, cells: &[f64]) -> Option<f64> {
    let widest = header
        .into_iter()
        .chain(cells.iter().copied())
        .filter(|w| w.is_finite())
        .fold(0.0_f64, f64::max);
    (widest > 0.0).then(|| widest.ceil())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_follows_pointer_with_minimum() {
        let mut session = ResizeSession::begin(2, 500.0, 120.0, false);
        assert_eq!(session.drag(530.0, 40.0), 150.0);
        assert_eq!(session.drag(400.0, 40.0), 40.0);
        assert!(session.changed());
        session.drag(500.0, 40.0);
        assert!(!session.changed());
        assert_eq!(session.column(), 2);
    }

    #[test]
    fn test_rtl_inverts_direction() {
        let mut session = ResizeSession::begin(0, 500.0, 120.0, true);
        assert_eq!(session.drag(470.0, 40.0), 150.0);
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width(Some(80.2), &[60.0, 95.1, 12.0]), Some(96.0));
        assert_eq!(fit_width(None, &[30.0]), Some(30.0));
        assert_eq!(fit_width(Some(0.0), &[]), None);
    }
}
