//! Metadata graph of a multi-module project.
//!
//! # Mental Model
//!
//! A [`Project`] holds the modules of a project, the file each module
//! declares its metadata in, and two registries built from those files:
//!
//! - the binding-type registry, whose enabled types are published to a
//!   [`discovery::DiscoverySink`];
//! - the path-mapping registry, which resolves every module's
//!   [`mapping::PathMapping`]s and records conflicts between modules that
//!   map the same repository path without an override relationship.
//!
//! Every mutating call is built as a [`manifold_transaction::Transaction`] of
//! reversible operations. If any step fails, module files, registries and the
//! discovery sink are restored to their prior state and the error of the
//! failing step is returned.
//!
//! # Key Types
//!
//! | Type | Role |
//! |---|---|
//! | [`Project`] | Owns modules, files, registries and collaborators |
//! | [`module::ModuleGraph`] | Modules by name, root module marker |
//! | [`module::OverrideGraph`] | Override edges from declarations and configuration |
//! | [`mapping::MappingGraph`] | Arena of path mappings and their conflicts |
//! | [`repository::PathMappingRegistry`] | Loaded mappings by (repository path, module) |
//! | [`discovery::BindingTypeRegistry`] | Loaded binding types by (type name, module) |

pub mod config;
pub mod discovery;
mod error;
pub mod file;
pub mod mapping;
pub mod module;
mod project;
pub mod repository;

pub use config::{ConfigError, ManifoldConfig};
pub use error::Error;
pub use project::Project;
