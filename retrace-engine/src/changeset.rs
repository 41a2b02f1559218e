//! Decoding of per-attribute before/after changesets.

use crate::{EngineError, EngineResult};
use retrace_codec::SnapshotCodec;
use retrace_store::VersionStore;
use retrace_types::VersionRecord;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One attribute's stored transition.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub before: Value,
    pub after: Value,
}

/// Decoded changeset: attribute name to `[before, after]` pair.
///
/// Keys are case-sensitive strings; lookup accepts anything string-like.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeMap(BTreeMap<String, AttributeChange>);

impl ChangeMap {
    /// The change recorded for an attribute, if any.
    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<&AttributeChange> {
        self.0.get(name.as_ref())
    }

    /// Number of changed attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(attribute, change)` pairs in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeChange)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Outcome of decoding a record's changeset.
///
/// `Unsupported` is distinct from an empty map: it means the store never
/// tracks diffs at all, while `Recorded(empty)` means this particular
/// record carries none.
#[derive(Debug, Clone, PartialEq)]
pub enum Changeset {
    /// The store has no changeset capability.
    Unsupported,
    /// The diffs recorded for this version (possibly none).
    Recorded(ChangeMap),
}

impl Changeset {
    /// Whether the store lacks changeset capability entirely.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Changeset::Unsupported)
    }
}

/// Decodes the optional per-attribute diff carried by a version record.
pub struct ChangesetDecoder {
    codec: Arc<dyn SnapshotCodec>,
    supported: bool,
}

impl ChangesetDecoder {
    /// Creates a decoder with an explicit capability flag.
    #[must_use]
    pub fn new(codec: Arc<dyn SnapshotCodec>, supported: bool) -> Self {
        Self { codec, supported }
    }

    /// Creates a decoder whose capability mirrors the given store's.
    #[must_use]
    pub fn for_store(codec: Arc<dyn SnapshotCodec>, store: &dyn VersionStore) -> Self {
        Self::new(codec, store.supports_changesets())
    }

    /// Decodes `record`'s changeset.
    ///
    /// Returns [`Changeset::Unsupported`] whenever the capability is
    /// absent, regardless of record content; an absent payload with the
    /// capability present decodes to an empty map.
    pub fn decode(&self, record: &VersionRecord) -> EngineResult<Changeset> {
        if !self.supported {
            return Ok(Changeset::Unsupported);
        }
        let Some(raw) = &record.changeset else {
            return Ok(Changeset::Recorded(ChangeMap::default()));
        };
        let attrs = self.codec.decode(raw)?;
        let mut map = BTreeMap::new();
        for (name, value) in attrs {
            let Value::Array(pair) = value else {
                return Err(EngineError::MalformedChangeset(name));
            };
            let [before, after] = <[Value; 2]>::try_from(pair)
                .map_err(|_| EngineError::MalformedChangeset(name.clone()))?;
            map.insert(name, AttributeChange { before, after });
        }
        Ok(Changeset::Recorded(ChangeMap(map)))
    }
}
