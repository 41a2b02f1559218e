//! Record-store layer for Retrace.
//!
//! Defines the [`VersionStore`] contract the engine consumes — filtered,
//! ordered selection over version records plus the append that assigns
//! sequence keys — and ships a SQLite-backed implementation.
//!
//! The engine treats the store as a single linearizable backend. No
//! retry policy lives here; a failed query surfaces as
//! [`StoreError::Database`] and retrying is the caller's decision.

mod error;
mod query;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use query::{QueryOrder, VersionQuery};
pub use sqlite::{SqliteVersionStore, StoreOptions};

use retrace_types::{NewVersionRecord, SequenceId, VersionRecord};

/// The record-store interface consumed by the engine.
///
/// Empty results are empty vectors, never errors; implementations only fail
/// when the backing store itself is unreachable or returns invalid rows.
pub trait VersionStore: Send + Sync {
    /// Runs a filtered, ordered selection of version records.
    fn select(&self, query: &VersionQuery) -> StoreResult<Vec<VersionRecord>>;

    /// Fetches one record of a chain by its sequence key.
    fn get(
        &self,
        entity_type: &str,
        entity_id: &str,
        sequence_id: SequenceId,
    ) -> StoreResult<Option<VersionRecord>>;

    /// Persists an unsequenced record, returning the assigned sequence key.
    /// Assigned keys are strictly increasing across the whole store.
    fn append(&self, record: &NewVersionRecord) -> StoreResult<SequenceId>;

    /// Whether this store tracks per-attribute changesets at all.
    /// A capability of the store's schema, not a per-record property.
    fn supports_changesets(&self) -> bool;
}
