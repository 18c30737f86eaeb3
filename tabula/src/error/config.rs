//! ConfigError for table configuration

/// Error type for invalid table configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No table identifier was given; persisted state cannot be keyed.
    #[error("Table ID must be provided")]
    MissingTableId,

    /// A page size of zero was configured.
    #[error("Invalid page size: {size}")]
    InvalidPageSize { size: usize },

    /// The row item size must be a positive number of pixels.
    #[error("Invalid item size: {size}")]
    InvalidItemSize { size: f64 },
}
