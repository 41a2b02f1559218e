//! Ordered navigation over version chains.

use crate::EngineResult;
use chrono::{DateTime, Utc};
use retrace_store::{QueryOrder, VersionQuery, VersionStore};
use retrace_types::{Event, VersionRecord};
use std::sync::Arc;

/// Sibling-relative queries and chain position, computed against the store.
///
/// Navigation never fails on an empty result — empty selections and absent
/// neighbors are ordinary outcomes. Only an unreachable store errors.
pub struct ChainNavigator {
    store: Arc<dyn VersionStore>,
}

impl ChainNavigator {
    /// Creates a navigator over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    // ── Query builders ───────────────────────────────────────────

    /// All records of one entity's chain, ascending by sequence id.
    pub fn with_entity_keys(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> EngineResult<Vec<VersionRecord>> {
        Ok(self
            .store
            .select(&VersionQuery::for_chain(entity_type, entity_id))?)
    }

    /// All `create` records in the store.
    pub fn creates(&self) -> EngineResult<Vec<VersionRecord>> {
        self.by_event(Event::Create)
    }

    /// All `update` records in the store.
    pub fn updates(&self) -> EngineResult<Vec<VersionRecord>> {
        self.by_event(Event::Update)
    }

    /// All `destroy` records in the store.
    pub fn destroys(&self) -> EngineResult<Vec<VersionRecord>> {
        self.by_event(Event::Destroy)
    }

    fn by_event(&self, event: Event) -> EngineResult<Vec<VersionRecord>> {
        Ok(self.store.select(&VersionQuery::new().with_event(event))?)
    }

    /// Records with a sequence id above `record`'s, ascending.
    pub fn subsequent(&self, record: &VersionRecord) -> EngineResult<Vec<VersionRecord>> {
        Ok(self
            .store
            .select(&VersionQuery::new().sequence_above(record.sequence_id))?)
    }

    /// Records with a sequence id below `record`'s, descending.
    pub fn preceding(&self, record: &VersionRecord) -> EngineResult<Vec<VersionRecord>> {
        Ok(self.store.select(
            &VersionQuery::new()
                .sequence_below(record.sequence_id)
                .order(QueryOrder::SequenceDesc),
        )?)
    }

    /// Records recorded strictly after `timestamp`, ordered
    /// `(recorded_at asc, sequence_id asc)`.
    pub fn following(&self, timestamp: DateTime<Utc>) -> EngineResult<Vec<VersionRecord>> {
        Ok(self.store.select(
            &VersionQuery::new()
                .recorded_after(timestamp)
                .order(QueryOrder::RecordedThenSequenceAsc),
        )?)
    }

    /// Records recorded strictly inside `(start, end)`, ordered as
    /// [`following`](Self::following).
    pub fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<VersionRecord>> {
        Ok(self.store.select(
            &VersionQuery::new()
                .recorded_between(start, end)
                .order(QueryOrder::RecordedThenSequenceAsc),
        )?)
    }

    // ── Single-record operations ─────────────────────────────────

    /// The next record in `record`'s chain, if any.
    pub fn next(&self, record: &VersionRecord) -> EngineResult<Option<VersionRecord>> {
        let (entity_type, entity_id) = record.chain_key();
        let mut found = self.store.select(
            &VersionQuery::for_chain(entity_type, entity_id)
                .sequence_above(record.sequence_id)
                .limit(1),
        )?;
        Ok(found.drain(..).next())
    }

    /// The previous record in `record`'s chain, if any.
    pub fn previous(&self, record: &VersionRecord) -> EngineResult<Option<VersionRecord>> {
        let (entity_type, entity_id) = record.chain_key();
        let mut found = self.store.select(
            &VersionQuery::for_chain(entity_type, entity_id)
                .sequence_below(record.sequence_id)
                .order(QueryOrder::SequenceDesc)
                .limit(1),
        )?;
        Ok(found.drain(..).next())
    }

    /// Zero-based rank of `record` within its chain, ascending by
    /// sequence id.
    ///
    /// Re-queries the full sibling list on every call. `None` only occurs
    /// when the record was concurrently deleted between listing and lookup;
    /// likewise a record inserted mid-navigation can shift ranks. Both are
    /// accepted read-committed races, not errors.
    pub fn index(&self, record: &VersionRecord) -> EngineResult<Option<usize>> {
        let (entity_type, entity_id) = record.chain_key();
        let siblings = self.with_entity_keys(entity_type, entity_id)?;
        Ok(siblings
            .iter()
            .position(|sibling| sibling.sequence_id == record.sequence_id))
    }

    /// Who put the entity into the state this record starts from:
    /// the previous record's actor, or `None` at the head of the chain.
    pub fn originator(&self, record: &VersionRecord) -> EngineResult<Option<String>> {
        Ok(self
            .previous(record)?
            .and_then(|previous| previous.actor))
    }
}
