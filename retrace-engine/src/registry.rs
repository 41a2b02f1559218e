//! Startup-populated type registry.
//!
//! Dynamic name-to-type resolution is modeled as an explicit registry:
//! each entity type registers its settable fields, its optional
//! polymorphism discriminator, and a factory for blank instances. The
//! registry is populated once at startup and read-only afterwards, so
//! lookups need no synchronization.

use retrace_types::Attributes;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// A blank-constructible entity the reifier can populate field by field.
///
/// `write_attribute` is a raw write: it stores the value verbatim without
/// re-running any validation or normalization a fresh mutation would apply,
/// since reification is historical reconstruction, not a new write.
pub trait ReifiedEntity: Send {
    /// The concrete type name of this instance.
    fn type_name(&self) -> &str;

    /// Writes a raw attribute value, bypassing derived-field logic.
    fn write_attribute(&mut self, name: &str, value: Value);

    /// Reads an attribute previously written, if any.
    fn attribute(&self, name: &str) -> Option<&Value>;
}

type Factory = Box<dyn Fn() -> Box<dyn ReifiedEntity> + Send + Sync>;

/// Per-type registration: settable fields, optional discriminator, factory.
pub struct TypeDescriptor {
    type_name: String,
    discriminator: Option<String>,
    fields: BTreeSet<String>,
    factory: Factory,
}

impl TypeDescriptor {
    /// Describes a type whose blank instances are [`DynamicEntity`] values.
    #[must_use]
    pub fn new(type_name: impl Into<String>, fields: impl IntoIterator<Item = String>) -> Self {
        let type_name = type_name.into();
        let factory_name = type_name.clone();
        Self {
            type_name,
            discriminator: None,
            fields: fields.into_iter().collect(),
            factory: Box::new(move || Box::new(DynamicEntity::new(factory_name.clone()))),
        }
    }

    /// Names the attribute that stores the true subtype under polymorphism.
    #[must_use]
    pub fn with_discriminator(mut self, field: impl Into<String>) -> Self {
        self.discriminator = Some(field.into());
        self
    }

    /// Replaces the blank-instance factory (for callers with bespoke
    /// entity structs).
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ReifiedEntity> + Send + Sync + 'static,
    {
        self.factory = Box::new(factory);
        self
    }

    /// The registered type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Name-to-type lookup consumed by the resolver and reifier.
pub trait TypeRegistry: Send + Sync {
    /// Whether the name maps to a registered type.
    fn contains(&self, type_name: &str) -> bool;

    /// The type's discriminator attribute name, if it participates in
    /// polymorphism.
    fn discriminator_field(&self, type_name: &str) -> Option<&str>;

    /// The set of fields the type accepts raw writes for. `None` when the
    /// type is unknown.
    fn settable_fields(&self, type_name: &str) -> Option<&BTreeSet<String>>;

    /// Constructs a blank instance of the type. `None` when unknown.
    fn instantiate(&self, type_name: &str) -> Option<Box<dyn ReifiedEntity>>;
}

/// The shipped [`TypeRegistry`]: a map of [`TypeDescriptor`]s built at
/// startup with [`register`](Self::register) and immutable afterwards.
#[derive(Default)]
pub struct EntityRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl EntityRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any previous registration of the same
    /// name. Builder-style so registries read as one expression at startup.
    #[must_use]
    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.types
            .insert(descriptor.type_name.clone(), descriptor);
        self
    }
}

impl TypeRegistry for EntityRegistry {
    fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    fn discriminator_field(&self, type_name: &str) -> Option<&str> {
        self.types
            .get(type_name)
            .and_then(|d| d.discriminator.as_deref())
    }

    fn settable_fields(&self, type_name: &str) -> Option<&BTreeSet<String>> {
        self.types.get(type_name).map(|d| &d.fields)
    }

    fn instantiate(&self, type_name: &str) -> Option<Box<dyn ReifiedEntity>> {
        self.types.get(type_name).map(|d| (d.factory)())
    }
}

/// Stock [`ReifiedEntity`] backed by an attribute map, for callers without
/// bespoke entity structs.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicEntity {
    type_name: String,
    attributes: Attributes,
}

impl DynamicEntity {
    /// A blank entity of the given concrete type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Attributes::new(),
        }
    }

    /// All attributes written so far.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Consumes the entity, yielding its attributes.
    #[must_use]
    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl ReifiedEntity for DynamicEntity {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn write_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}
