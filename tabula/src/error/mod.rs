//! Error types

mod config;
mod path;
mod store;

pub use config::*;
pub use path::*;
pub use store::*;

/// Top-level error for table operations that can fail.
///
/// Almost every engine operation is total; only mounting a table with a bad
/// configuration and (de)serializing the state store surface errors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The state store could not be encoded or decoded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A dotted-path expression was malformed.
    #[error(transparent)]
    Path(#[from] PathError),
}
