use manifold_index::IndexError;
use manifold_transaction::{AtomicOperation, OperationInterceptor};

use super::registry::RemovedMapping;
use crate::mapping::PathMapping;
use crate::module::ModuleProvider;
use crate::{Error, Project};

/// Adds a path mapping to a module file, restoring a replaced one on rollback.
#[derive(Debug)]
pub struct AddPathMappingToFile {
	module: String,
	mapping: PathMapping,
	previous: Option<PathMapping>,
}

impl AddPathMappingToFile {
	pub fn new(module: impl Into<String>, mapping: PathMapping) -> Self {
		Self {
			module: module.into(),
			mapping,
			previous: None,
		}
	}
}

impl AtomicOperation<Project> for AddPathMappingToFile {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let file = ctx.files.get_mut(&self.module)?;
		self.previous = file.path_mapping(self.mapping.repository_path()).cloned();
		file.add_path_mapping(self.mapping.clone())?;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		let repository_path = self.mapping.repository_path();
		let result = ctx.files.get_mut(&self.module).and_then(|file| match self.previous.take() {
			Some(previous) => file.add_path_mapping(previous),
			None => file.remove_path_mapping(repository_path).map(|_| ()),
		});
		if let Err(error) = result {
			tracing::error!(module = %self.module, repository_path, %error, "failed to restore module file");
		}
	}
}

/// Removes a path mapping from a module file, putting it back at its former
/// position on rollback.
#[derive(Debug)]
pub struct RemovePathMappingFromFile {
	module: String,
	repository_path: String,
	previous: Option<(usize, PathMapping)>,
}

impl RemovePathMappingFromFile {
	pub fn new(module: impl Into<String>, repository_path: impl Into<String>) -> Self {
		Self {
			module: module.into(),
			repository_path: repository_path.into(),
			previous: None,
		}
	}
}

impl AtomicOperation<Project> for RemovePathMappingFromFile {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		self.previous = ctx.files.get_mut(&self.module)?.remove_path_mapping(&self.repository_path)?;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		let Some((position, previous)) = self.previous.take() else {
			return;
		};
		if let Err(error) = ctx.files.get_mut(&self.module).and_then(|file| file.restore_path_mapping(position, previous)) {
			tracing::error!(module = %self.module, repository_path = %self.repository_path, %error, "failed to restore module file");
		}
	}
}

/// Loads a declared mapping for a module and registers it.
///
/// Load errors of individual references do not fail the operation; they
/// stay on the mapping.
#[derive(Debug)]
pub struct LoadPathMapping {
	module: String,
	mapping: PathMapping,
	loaded: bool,
}

impl LoadPathMapping {
	pub fn new(module: impl Into<String>, mapping: PathMapping) -> Self {
		Self {
			module: module.into(),
			mapping: mapping.declaration(),
			loaded: false,
		}
	}
}

impl AtomicOperation<Project> for LoadPathMapping {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let repository_path = self.mapping.repository_path();
		if ctx.mappings.contains(repository_path, &self.module) {
			return Err(Error::DuplicatePathMapping {
				repository_path: repository_path.to_string(),
				module: self.module.clone(),
			});
		}

		let mut mapping = self.mapping.clone();
		let owner = ctx.modules.module_by_name(&self.module)?;
		let errors = mapping.load(owner, &ctx.modules, ctx.filesystem.as_ref())?;
		for error in &errors {
			tracing::debug!(module = %self.module, repository_path, %error, "unresolved path reference");
		}
		ctx.mappings.insert(&self.module, mapping);
		self.loaded = true;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		if !std::mem::take(&mut self.loaded) {
			return;
		}
		if ctx.mappings.remove(self.mapping.repository_path(), &self.module).is_none() {
			tracing::error!(module = %self.module, repository_path = self.mapping.repository_path(), "loaded mapping vanished before rollback");
		}
	}
}

/// Takes a loaded mapping out of the registry.
#[derive(Debug)]
pub struct UnloadPathMapping {
	module: String,
	repository_path: String,
	removed: Option<RemovedMapping>,
}

impl UnloadPathMapping {
	pub fn new(module: impl Into<String>, repository_path: impl Into<String>) -> Self {
		Self {
			module: module.into(),
			repository_path: repository_path.into(),
			removed: None,
		}
	}
}

impl AtomicOperation<Project> for UnloadPathMapping {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let removed = ctx.mappings.remove(&self.repository_path, &self.module).ok_or_else(|| IndexError::EntryNotFound {
			primary: self.repository_path.clone(),
			secondary: self.module.clone(),
		})?;
		self.removed = Some(removed);
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		if let Some(removed) = self.removed.take() {
			ctx.mappings.restore(removed);
		}
	}
}

/// Rebuilds path conflicts after a mapping was loaded or unloaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshConflicts;

impl OperationInterceptor<Project> for RefreshConflicts {
	type Error = Error;

	fn post_execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		ctx.mappings.refresh_conflicts();
		Ok(())
	}

	fn post_rollback(&mut self, ctx: &mut Project) {
		ctx.mappings.refresh_conflicts();
	}
}
