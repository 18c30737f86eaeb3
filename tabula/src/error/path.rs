//! PathError for dotted-path expressions

/// Error type for malformed dotted-path expressions such as `"a..b"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The expression was empty.
    #[error("Path expression is empty")]
    Empty,

    /// The expression contains an empty segment.
    #[error("Path '{path}' has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },
}
