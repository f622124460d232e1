//! Binding types declared by modules.
//!
//! # Purpose
//!
//! Modules declare [`BindingTypeDescriptor`]s in their files. Loading a module
//! registers its descriptors in the [`BindingTypeRegistry`] under
//! `(type name, module)`. A type defined by more than one module is marked
//! duplicate on every descriptor and is withdrawn from the
//! [`DiscoverySink`]; a type defined by exactly one module is published.
//!
//! # Invariants
//!
//! - After every registry mutation the duplicate marks of the affected type
//!   name are recomputed by an [`operations::UpdateDuplicateMarks`] interceptor.
//! - The sink defines a type iff the registry has an enabled descriptor for
//!   it, as long as every mutation goes through the [`crate::Project`] methods.

mod descriptor;
mod error;
mod manager;
pub mod operations;
mod registry;
mod sink;

pub use descriptor::{BindingParameter, BindingType, BindingTypeDescriptor};
pub use error::DiscoveryError;
pub use registry::BindingTypeRegistry;
pub use sink::{DiscoverySink, InMemoryDiscovery};

#[cfg(test)]
mod tests;
