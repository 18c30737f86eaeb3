//! StoreError for state store persistence

/// Error type for encoding or decoding a state store snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
}
