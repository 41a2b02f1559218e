//! Snapshot codec for Retrace.
//!
//! Encodes and decodes the attribute mapping a version record persists.
//! The engine depends only on the [`SnapshotCodec`] contract; the shipped
//! implementation is JSON via serde_json. Decode fails loudly on malformed
//! input — it never returns a partial mapping, since silent data loss is
//! worse than a loud failure.

use retrace_types::Attributes;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not syntactically valid for the codec's format.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload parsed, but is not an attribute mapping at the top level.
    #[error("payload is not an attribute mapping")]
    NotAMapping,
}

/// Encodes and decodes attribute mappings to and from persisted text.
pub trait SnapshotCodec: Send + Sync {
    /// Encodes an attribute mapping to its persisted representation.
    fn encode(&self, attrs: &Attributes) -> CodecResult<String>;

    /// Decodes a persisted payload back into an attribute mapping.
    fn decode(&self, raw: &str) -> CodecResult<Attributes>;
}

/// JSON snapshot codec. Stateless; a single instance may be shared freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSnapshotCodec;

impl SnapshotCodec for JsonSnapshotCodec {
    fn encode(&self, attrs: &Attributes) -> CodecResult<String> {
        Ok(serde_json::to_string(attrs)?)
    }

    fn decode(&self, raw: &str) -> CodecResult<Attributes> {
        match serde_json::from_str::<serde_json::Value>(raw)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(CodecError::NotAMapping),
        }
    }
}
