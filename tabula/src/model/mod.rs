//! Row and column model.
//!
//! Rows are immutable snapshots of raw JSON records, replaced wholesale on
//! every data load. Columns carry width constraints and a mutable computed
//! width owned by the layout engine.

mod column;
mod path;
mod row;

pub use column::{Column, normalize_columns};
pub use path::{Path, by_string, value_to_string};
pub use row::{Row, RowId, rows_from_records};
