//! Headless data-table engine
//!
//! Row and column state, selection, multi-column sorting, grouping with
//! collapse, offset and cursor paging, and column-width layout for a
//! virtualized table. Rendering is left to the host, which supplies
//! geometry through the [`viewport`] traits.

pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod filter;
pub mod group;
pub mod layout;
pub mod model;
pub mod paging;
pub mod selection;
pub mod sort;
pub mod store;
pub mod viewport;

mod table;

pub use config::TableConfig;
pub use error::TableError;
pub use store::StateStore;
pub use table::*;
