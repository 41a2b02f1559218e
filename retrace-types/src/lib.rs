//! Core type definitions for Retrace.
//!
//! This crate defines the fundamental types shared by the storage and engine
//! layers:
//! - [`Event`] — the three state-transition classifications
//! - [`SequenceId`] — the store-assigned, totally ordered chain key
//! - [`VersionRecord`] — one immutable row per tracked-entity transition
//! - [`NewVersionRecord`] — the unsequenced form handed to a store's append
//!
//! Domain-specific entity shapes (what a "Post" or a "Vehicle" looks like)
//! belong to the caller's type registry, not here.

mod event;
mod record;

pub use event::Event;
pub use record::{NewVersionRecord, SequenceId, VersionRecord};

/// Decoded attribute mapping of a snapshot or changeset payload.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, TypeError>;

/// Errors that can occur when materializing core types from stored data.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The record lacks a recognizable event classification. Carries the
    /// offending literal when one was present.
    #[error("record has no valid event classification (found {0:?})")]
    MissingEvent(Option<String>),
}
