//! The Retrace history engine.
//!
//! Given version records fetched from a [`retrace_store::VersionStore`],
//! this crate:
//! - reconstructs ("reifies") typed in-memory entities from stored
//!   snapshots, resolving polymorphic subtypes via a startup-populated
//!   type registry ([`Reifier`], [`TypeResolver`], [`TypeRegistry`])
//! - decodes the optional per-attribute before/after diff
//!   ([`ChangesetDecoder`])
//! - navigates a chain relative to one record — preceding, subsequent,
//!   time-windowed, position ([`ChainNavigator`])
//!
//! All operations are synchronous, stateless computations over immutable
//! records; they may run concurrently across threads without coordination.

mod changeset;
mod error;
mod navigator;
mod registry;
mod reifier;
mod resolver;

pub use changeset::{AttributeChange, ChangeMap, Changeset, ChangesetDecoder};
pub use error::{EngineError, EngineResult};
pub use navigator::ChainNavigator;
pub use registry::{DynamicEntity, EntityRegistry, ReifiedEntity, TypeDescriptor, TypeRegistry};
pub use reifier::{IdentityCacheGuard, Reified, Reifier, ReifyOptions};
pub use resolver::TypeResolver;
