use manifold_transaction::Transaction;

use super::operations::{AddPathMappingToFile, LoadPathMapping, RefreshConflicts, RemovePathMappingFromFile, UnloadPathMapping};
use super::ConflictSnapshot;
use crate::mapping::{PathConflict, PathMapping, normalize_repository_path};
use crate::{Error, Project};

impl Project {
	/// Loads every path mapping declared in the module's file.
	pub fn load_module_mappings(&mut self, module: &str) -> Result<(), Error> {
		self.load_module_mappings_transaction(module)?.commit(self)?;
		Ok(())
	}

	/// Unloads every path mapping the module has loaded.
	pub fn unload_module_mappings(&mut self, module: &str) -> Result<(), Error> {
		self.unload_module_mappings_transaction(module)?.commit(self)?;
		Ok(())
	}

	/// Declares a mapping in the root module file and loads it.
	///
	/// # Errors
	///
	/// - [`Error::NoRootModule`] without a root module.
	/// - [`Error::DuplicatePathMapping`] if the root module already maps the path.
	pub fn add_root_path_mapping(&mut self, mapping: PathMapping) -> Result<(), Error> {
		let root = self.root_name()?;
		let repository_path = mapping.repository_path().to_string();
		if self.mappings.contains(&repository_path, &root) || self.files.get(&root)?.has_path_mapping(&repository_path) {
			return Err(Error::DuplicatePathMapping { repository_path, module: root });
		}

		let mut transaction: Transaction<Project, Error> = Transaction::new();
		transaction
			.push(AddPathMappingToFile::new(root.clone(), mapping.clone()))
			.push_intercepted(LoadPathMapping::new(root.clone(), mapping), RefreshConflicts);
		transaction.commit(self)?;
		tracing::debug!(module = %root, repository_path = %repository_path, "added root path mapping");
		Ok(())
	}

	/// Unloads a root mapping and removes it from the root module file.
	///
	/// Does nothing if the root module does not map `repository_path`.
	pub fn remove_root_path_mapping(&mut self, repository_path: &str) -> Result<(), Error> {
		let root = self.root_name()?;
		let repository_path = normalize_repository_path(repository_path)?;
		let loaded = self.mappings.contains(&repository_path, &root);
		if !loaded && !self.files.get(&root)?.has_path_mapping(&repository_path) {
			return Ok(());
		}

		let mut transaction: Transaction<Project, Error> = Transaction::new();
		if loaded {
			transaction.push_intercepted(UnloadPathMapping::new(root.clone(), repository_path.clone()), RefreshConflicts);
		}
		transaction.push(RemovePathMappingFromFile::new(root.clone(), repository_path.clone()));
		transaction.commit(self)?;
		tracing::debug!(module = %root, repository_path = %repository_path, "removed root path mapping");
		Ok(())
	}

	/// Mapping loaded by `module` at `repository_path`.
	pub fn path_mapping(&self, repository_path: &str, module: &str) -> Result<&PathMapping, Error> {
		Ok(self.mappings.get(repository_path, module)?)
	}

	/// Every loaded mapping at `repository_path`, in load order.
	pub fn path_mappings(&self, repository_path: &str) -> Vec<&PathMapping> {
		self.mappings.mappings_at(repository_path)
	}

	pub fn module_path_mappings(&self, module: &str) -> Vec<&PathMapping> {
		self.mappings.module_mappings(module)
	}

	pub fn has_path_mapping(&self, repository_path: &str) -> bool {
		!self.mappings.mappings_at(repository_path).is_empty()
	}

	pub fn path_conflicts(&self) -> Vec<&PathConflict> {
		self.mappings.conflicts()
	}

	pub fn conflict_snapshot(&self) -> Vec<ConflictSnapshot> {
		self.mappings.conflict_snapshot()
	}

	pub(crate) fn load_module_mappings_transaction(&self, module: &str) -> Result<Transaction<Project, Error>, Error> {
		let mut transaction: Transaction<Project, Error> = Transaction::new();
		for mapping in self.files.get(module)?.path_mappings() {
			transaction.push_intercepted(LoadPathMapping::new(module, mapping.clone()), RefreshConflicts);
		}
		Ok(transaction)
	}

	pub(crate) fn unload_module_mappings_transaction(&self, module: &str) -> Result<Transaction<Project, Error>, Error> {
		let mut transaction: Transaction<Project, Error> = Transaction::new();
		for mapping in self.mappings.module_mappings(module) {
			transaction.push_intercepted(UnloadPathMapping::new(module, mapping.repository_path()), RefreshConflicts);
		}
		Ok(transaction)
	}
}
