//! Declared-type to concrete-type resolution.
//!
//! Under single-table-style polymorphism the declared `entity_type` of a
//! record is the base type; the snapshot's discriminator attribute names the
//! subtype the entity actually was. Resolution depends only on the declared
//! type and the snapshot, never on a live lookup, so it works for entities
//! that have since been destroyed.

use crate::registry::{ReifiedEntity, TypeRegistry};
use crate::{EngineError, EngineResult};
use retrace_types::Attributes;
use serde_json::Value;
use std::sync::Arc;

/// Resolves the concrete runtime type to instantiate for a record.
pub struct TypeResolver {
    registry: Arc<dyn TypeRegistry>,
}

impl TypeResolver {
    /// Creates a resolver over the given registry.
    #[must_use]
    pub fn new(registry: Arc<dyn TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves `declared` against the decoded snapshot.
    ///
    /// A supplied live instance short-circuits everything: its current type
    /// is definitionally correct and cheaper than re-deriving it. Otherwise
    /// the declared type's discriminator attribute is consulted — absent or
    /// blank means the base type, anything else names the stored subtype.
    ///
    /// Fails with [`EngineError::UnknownType`] when the result is not in
    /// the registry.
    pub fn resolve(
        &self,
        declared: &str,
        snapshot: Option<&Attributes>,
        live: Option<&dyn ReifiedEntity>,
    ) -> EngineResult<String> {
        if let Some(live) = live {
            return self.known(live.type_name());
        }
        if !self.registry.contains(declared) {
            return Err(EngineError::UnknownType(declared.to_string()));
        }
        let resolved = match self.registry.discriminator_field(declared) {
            None => declared,
            Some(field) => match snapshot.and_then(|attrs| attrs.get(field)) {
                Some(Value::String(subtype)) if !subtype.trim().is_empty() => subtype.as_str(),
                _ => declared,
            },
        };
        self.known(resolved)
    }

    fn known(&self, type_name: &str) -> EngineResult<String> {
        if self.registry.contains(type_name) {
            Ok(type_name.to_string())
        } else {
            Err(EngineError::UnknownType(type_name.to_string()))
        }
    }
}
