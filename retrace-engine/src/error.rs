//! Error types for the engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A resolved type name is not present in the type registry.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// A stored snapshot or changeset payload failed to decode.
    #[error("codec error: {0}")]
    Codec(#[from] retrace_codec::CodecError),

    /// The record store failed; retry is left to the caller.
    #[error("store error: {0}")]
    Store(#[from] retrace_store::StoreError),

    /// A changeset entry was not the expected `[before, after]` pair.
    #[error("malformed changeset entry for attribute {0:?}")]
    MalformedChangeset(String),
}
