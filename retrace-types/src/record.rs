//! The version record — one immutable row per tracked-entity state transition.

use crate::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned, totally ordered sequence key.
///
/// Serves as the primary ordering axis of a chain and as the tiebreaker
/// for timestamp-ordered queries. No two records share a sequence id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(i64);

impl SequenceId {
    /// Wraps a raw store-assigned key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the underlying key.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted state transition of one tracked entity.
///
/// Records are immutable once persisted. Records sharing an
/// `(entity_type, entity_id)` key form a chain, strictly ordered by
/// [`SequenceId`]. The engine only ever reads, decodes, and navigates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// The store-assigned ordering key.
    pub sequence_id: SequenceId,

    /// Declared type of the tracked entity. Under polymorphism this may be
    /// a base type; the snapshot's discriminator names the true subtype.
    pub entity_type: String,

    /// Identifier of the tracked entity instance within its type.
    pub entity_id: String,

    /// What kind of transition this record captures.
    pub event: Event,

    /// Opaque token for whoever produced this transition. Passed through
    /// verbatim; the engine attaches no semantics to it.
    pub actor: Option<String>,

    /// When the transition happened.
    pub recorded_at: DateTime<Utc>,

    /// Encoded full attribute state of the entity as of this event.
    /// Absent for create-path configurations that skip snapshotting.
    pub snapshot: Option<String>,

    /// Encoded per-attribute `[before, after]` diff. Absent when no diff
    /// was recorded; whether diffs are tracked at all is a store capability,
    /// not a per-record flag.
    pub changeset: Option<String>,
}

impl VersionRecord {
    /// The chain key shared by all versions of one entity.
    #[must_use]
    pub fn chain_key(&self) -> (&str, &str) {
        (&self.entity_type, &self.entity_id)
    }

    /// Who changed the entity away from the state this record captures.
    ///
    /// Semantic alias for [`actor`](Self::actor); the record itself already
    /// denotes who produced the transition it represents.
    #[must_use]
    pub fn terminator(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}

/// A version record before the store has assigned its sequence key.
///
/// Produced by the instrumentation layer (or tests) and handed to
/// `VersionStore::append`, which returns the assigned [`SequenceId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVersionRecord {
    pub entity_type: String,
    pub entity_id: String,
    pub event: Event,
    pub actor: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub snapshot: Option<String>,
    pub changeset: Option<String>,
}

impl NewVersionRecord {
    /// Creates an unsequenced record with the given classification.
    #[must_use]
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        event: Event,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            event,
            actor: None,
            recorded_at,
            snapshot: None,
            changeset: None,
        }
    }

    /// Sets the actor token.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Sets the encoded snapshot payload.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: impl Into<String>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    /// Sets the encoded changeset payload.
    #[must_use]
    pub fn with_changeset(mut self, changeset: impl Into<String>) -> Self {
        self.changeset = Some(changeset.into());
        self
    }
}
