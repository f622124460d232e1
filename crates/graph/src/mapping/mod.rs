//! Path mappings and the conflict graph between them.
//!
//! # Purpose
//!
//! A [`PathMapping`] maps a repository path onto filesystem locations inside
//! module root directories. Loading resolves every [`PathReference`] and lists
//! the resolved trees recursively so that every produced repository path is
//! known. [`MappingGraph`] owns loaded and unloaded mappings together with
//! the [`PathConflict`]s that link mappings competing for the same path.
//!
//! # Invariants
//!
//! - Unresolvable references are recorded as [`LoadError`]s and never abort a load.
//! - Loading twice without unloading fails with [`MappingError::AlreadyLoaded`].
//! - The mapping/conflict relation is symmetric; see [`MappingGraph`].

mod conflict;
mod error;
mod fs;
mod graph;
mod path_mapping;
mod reference;

pub use conflict::{ConflictId, MappingId, PathConflict};
pub use error::{LoadError, MappingError};
pub use fs::{FilesystemProbe, OsFilesystem};
pub use graph::MappingGraph;
pub use path_mapping::{MappingState, PathMapping};
pub use reference::{PathReference, normalize_repository_path};
