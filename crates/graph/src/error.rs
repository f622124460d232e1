use manifold_index::IndexError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::discovery::DiscoveryError;
use crate::file::FileError;
use crate::mapping::MappingError;
use crate::module::ModuleError;

/// Failure of a [`crate::Project`] operation.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Index(#[from] IndexError),
	#[error(transparent)]
	Module(#[from] ModuleError),
	#[error(transparent)]
	Mapping(#[from] MappingError),
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	#[error(transparent)]
	File(#[from] FileError),
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("project has no root module")]
	NoRootModule,
	#[error("module {module} already maps {repository_path}")]
	DuplicatePathMapping { repository_path: String, module: String },
}
