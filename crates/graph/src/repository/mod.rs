//! Loaded path mappings of every module and the conflicts between them.
//!
//! # Purpose
//!
//! [`PathMappingRegistry`] indexes loaded mappings by repository path and
//! module. Every repository path a mapping produces is claimed for its module;
//! when two modules claim a path and neither overrides the other, the path
//! becomes a [`crate::mapping::PathConflict`] attached to the mappings involved.
//! Conflicts are recorded, never resolved automatically.
//!
//! The [`crate::Project`] methods in this module build transactions from the
//! operations in [`operations`], each load and unload followed by a
//! [`operations::RefreshConflicts`] interceptor.

mod manager;
pub mod operations;
mod registry;

pub use registry::{ConflictSnapshot, PathMappingRegistry};
