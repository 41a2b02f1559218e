//! Filter and ordering builder for version selections.

use chrono::{DateTime, Utc};
use retrace_types::{Event, SequenceId};

/// Ordering applied to selection results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrder {
    /// Ascending by sequence id.
    #[default]
    SequenceAsc,
    /// Descending by sequence id.
    SequenceDesc,
    /// `(recorded_at asc, sequence_id asc)`. Timestamps are not unique, so
    /// the sequence id breaks ties deterministically.
    RecordedThenSequenceAsc,
}

/// A filtered, ordered selection over version records.
///
/// All filters are optional and combine with AND. Bounds are strict:
/// `sequence_above`/`sequence_below` exclude the bound itself, and the
/// `recorded_after`/`recorded_before` pair forms an open interval.
#[derive(Debug, Clone, Default)]
pub struct VersionQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub event: Option<Event>,
    pub sequence_above: Option<SequenceId>,
    pub sequence_below: Option<SequenceId>,
    pub recorded_after: Option<DateTime<Utc>>,
    pub recorded_before: Option<DateTime<Utc>>,
    pub order: QueryOrder,
    pub limit: Option<usize>,
}

impl VersionQuery {
    /// An unfiltered selection, ascending by sequence id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the selection to one entity's chain.
    #[must_use]
    pub fn for_chain(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    /// Filters by event classification.
    #[must_use]
    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Some(event);
        self
    }

    /// Keeps records with `sequence_id > bound`.
    #[must_use]
    pub fn sequence_above(mut self, bound: SequenceId) -> Self {
        self.sequence_above = Some(bound);
        self
    }

    /// Keeps records with `sequence_id < bound`.
    #[must_use]
    pub fn sequence_below(mut self, bound: SequenceId) -> Self {
        self.sequence_below = Some(bound);
        self
    }

    /// Keeps records with `recorded_at > bound`.
    #[must_use]
    pub fn recorded_after(mut self, bound: DateTime<Utc>) -> Self {
        self.recorded_after = Some(bound);
        self
    }

    /// Keeps records with `start < recorded_at < end`.
    #[must_use]
    pub fn recorded_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.recorded_after = Some(start);
        self.recorded_before = Some(end);
        self
    }

    /// Sets the result ordering.
    #[must_use]
    pub fn order(mut self, order: QueryOrder) -> Self {
        self.order = order;
        self
    }

    /// Caps the number of returned records.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
