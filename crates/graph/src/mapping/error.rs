use std::path::PathBuf;

use thiserror::Error;

use super::{ConflictId, MappingId};

/// A path reference that could not be resolved during [`super::PathMapping::load`].
///
/// Load errors are data: they are collected on the mapping and never abort
/// the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
	#[error("path reference {reference:?} names unknown module {module}")]
	NoSuchModule { reference: String, module: String },
	#[error("path reference {reference:?} resolves to missing path {}", path.display())]
	FileNotFound { reference: String, path: PathBuf },
}

/// Contract and lifecycle violations on path mappings and conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
	#[error("repository path must be absolute: {path:?}")]
	InvalidRepositoryPath { path: String },
	#[error("path mapping for {repository_path} declares no path references")]
	NoPathReferences { repository_path: String },
	#[error("conflict at {conflict_path} does not overlap mapping {repository_path}")]
	ConflictPathMismatch { conflict_path: String, repository_path: String },
	#[error("path mapping for {repository_path} is already loaded")]
	AlreadyLoaded { repository_path: String },
	#[error("path mapping for {repository_path} is not loaded")]
	NotLoaded { repository_path: String },
	#[error("unknown path mapping {0:?}")]
	UnknownMapping(MappingId),
	#[error("unknown path conflict {0:?}")]
	UnknownConflict(ConflictId),
}

impl MappingError {
	/// True for `AlreadyLoaded` / `NotLoaded`.
	pub fn is_lifecycle(&self) -> bool {
		matches!(self, Self::AlreadyLoaded { .. } | Self::NotLoaded { .. })
	}

	/// True for malformed input and unrelated conflict paths.
	pub fn is_invalid_argument(&self) -> bool {
		matches!(
			self,
			Self::InvalidRepositoryPath { .. } | Self::NoPathReferences { .. } | Self::ConflictPathMismatch { .. }
		)
	}
}
