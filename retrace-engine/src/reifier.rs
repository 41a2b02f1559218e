//! Reconstruction of typed entities from stored snapshots.

use crate::registry::{ReifiedEntity, TypeRegistry};
use crate::resolver::TypeResolver;
use crate::{EngineError, EngineResult};
use retrace_codec::SnapshotCodec;
use retrace_types::VersionRecord;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Scoped suppression of a live-keyed identity cache.
///
/// Environments that maintain a per-process identity map keyed by
/// `(type, id)` must not let a historical reconstruction enter it, or
/// subsequent live lookups would be corrupted. Install a guard to have the
/// reifier run instantiation and population inside its `bypass` scope.
/// Environments without such a cache simply install no guard.
pub trait IdentityCacheGuard: Send + Sync {
    /// Runs `f` with the identity cache suppressed.
    fn bypass(&self, f: &mut dyn FnMut());
}

/// Options controlling a single reify call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReifyOptions {
    /// Populate the supplied live instance in place instead of building a
    /// fresh blank instance of its type.
    pub reuse_live: bool,
}

/// A reconstructed entity plus the version record it was built from.
///
/// The back-reference is an auxiliary slot, not a field of the entity
/// itself; it lets callers ask "which version produced this instance"
/// without touching any persisted attribute.
pub struct Reified {
    entity: Box<dyn ReifiedEntity>,
    version: VersionRecord,
}

impl Reified {
    /// The reconstructed entity.
    #[must_use]
    pub fn entity(&self) -> &dyn ReifiedEntity {
        self.entity.as_ref()
    }

    /// Mutable access to the reconstructed entity.
    pub fn entity_mut(&mut self) -> &mut dyn ReifiedEntity {
        self.entity.as_mut()
    }

    /// The record this instance was reified from.
    #[must_use]
    pub fn version(&self) -> &VersionRecord {
        &self.version
    }

    /// Consumes the pair, yielding the entity alone.
    #[must_use]
    pub fn into_entity(self) -> Box<dyn ReifiedEntity> {
        self.entity
    }
}

// Manual impl: the boxed entity is a trait object, so only its type name
// is representable.
impl fmt::Debug for Reified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reified")
            .field("type_name", &self.entity.type_name())
            .field("version", &self.version)
            .finish()
    }
}

/// Rebuilds typed entities from version records.
///
/// Stateless apart from read-only handles; safe to share across threads and
/// call concurrently for different records.
pub struct Reifier {
    registry: Arc<dyn TypeRegistry>,
    codec: Arc<dyn SnapshotCodec>,
    resolver: TypeResolver,
    cache_guard: Option<Arc<dyn IdentityCacheGuard>>,
}

impl Reifier {
    /// Creates a reifier over the given registry and codec.
    #[must_use]
    pub fn new(registry: Arc<dyn TypeRegistry>, codec: Arc<dyn SnapshotCodec>) -> Self {
        let resolver = TypeResolver::new(Arc::clone(&registry));
        Self {
            registry,
            codec,
            resolver,
            cache_guard: None,
        }
    }

    /// Installs an identity-cache suppression guard.
    #[must_use]
    pub fn with_cache_guard(mut self, guard: Arc<dyn IdentityCacheGuard>) -> Self {
        self.cache_guard = Some(guard);
        self
    }

    /// Reconstructs the entity as it existed at `record`.
    ///
    /// Returns `Ok(None)` when the record carries no snapshot — a valid
    /// outcome, not an error. A supplied `live` instance short-circuits
    /// type resolution to its own type; with [`ReifyOptions::reuse_live`]
    /// it is additionally populated in place instead of a fresh instance.
    ///
    /// Snapshot attributes with no settable counterpart on the resolved
    /// type (schema drift) are skipped with a warning; they never abort
    /// reification.
    pub fn reify(
        &self,
        record: &VersionRecord,
        live: Option<Box<dyn ReifiedEntity>>,
        options: &ReifyOptions,
    ) -> EngineResult<Option<Reified>> {
        let Some(raw) = &record.snapshot else {
            return Ok(None);
        };
        let attrs = self.codec.decode(raw)?;
        let concrete = self
            .resolver
            .resolve(&record.entity_type, Some(&attrs), live.as_deref())?;

        let mut live = live;
        let mut outcome: Option<EngineResult<Box<dyn ReifiedEntity>>> = None;
        {
            let mut build = || {
                let target = match live.take() {
                    Some(instance) if options.reuse_live => Ok(instance),
                    _ => self
                        .registry
                        .instantiate(&concrete)
                        .ok_or_else(|| EngineError::UnknownType(concrete.clone())),
                };
                outcome = Some(target.map(|mut entity| {
                    self.populate(entity.as_mut(), &attrs, record);
                    entity
                }));
            };
            match &self.cache_guard {
                Some(guard) => guard.bypass(&mut build),
                None => build(),
            }
        }
        // The guard contract is to invoke the closure exactly once.
        let entity = outcome.expect("identity cache guard did not invoke the reify scope")?;

        Ok(Some(Reified {
            entity,
            version: record.clone(),
        }))
    }

    fn populate(
        &self,
        target: &mut dyn ReifiedEntity,
        attrs: &retrace_types::Attributes,
        record: &VersionRecord,
    ) {
        let fields = self.registry.settable_fields(target.type_name());
        for (key, value) in attrs {
            match fields {
                Some(fields) if fields.contains(key) => {
                    target.write_attribute(key, value.clone());
                }
                _ => {
                    warn!(
                        attribute = %key,
                        entity_type = %record.entity_type,
                        sequence_id = %record.sequence_id,
                        "attribute does not exist on current type, skipping"
                    );
                }
            }
        }
    }
}
