use indexmap::IndexSet;
use manifold_transaction::Transaction;

use super::operations::{
	AddTypeDescriptorToFile, LoadTypeDescriptor, RemoveTypeDescriptorFromFile, SyncTypeName, UnloadTypeDescriptor, UpdateDuplicateMarks,
};
use super::{BindingTypeDescriptor, DiscoveryError};
use crate::{Error, Project};

impl Project {
	/// Loads every binding type declared in the module's file and publishes
	/// the types that end up enabled.
	pub fn load_module_types(&mut self, module: &str) -> Result<(), Error> {
		self.load_module_types_transaction(module)?.commit(self)?;
		Ok(())
	}

	/// Unloads every binding type the module has loaded.
	pub fn unload_module_types(&mut self, module: &str) -> Result<(), Error> {
		self.unload_module_types_transaction(module)?.commit(self)?;
		Ok(())
	}

	/// Declares a binding type in the root module file, loads it and
	/// synchronizes the discovery sink.
	///
	/// # Errors
	///
	/// - [`Error::NoRootModule`] without a root module.
	/// - [`DiscoveryError::DuplicateType`] if the root module already declares the type.
	pub fn add_root_type_descriptor(&mut self, descriptor: BindingTypeDescriptor) -> Result<(), Error> {
		let root = self.root_name()?;
		let type_name = descriptor.type_name().to_string();
		if self.files.get(&root)?.has_type_descriptor(&type_name) {
			return Err(DiscoveryError::DuplicateType { type_name, module: root }.into());
		}

		let sync = SyncTypeName::snapshot(self, type_name.as_str());
		let mut transaction: Transaction<Project, Error> = Transaction::new();
		transaction
			.push(AddTypeDescriptorToFile::new(root.clone(), descriptor.clone()))
			.push_intercepted(LoadTypeDescriptor::new(root.clone(), descriptor), UpdateDuplicateMarks::new(type_name.as_str()))
			.push(sync);
		transaction.commit(self)?;
		tracing::debug!(module = %root, type_name = %type_name, "added root binding type");
		Ok(())
	}

	/// Unloads a root binding type and removes it from the root module file.
	///
	/// Does nothing if the root module does not declare `type_name`.
	pub fn remove_root_type_descriptor(&mut self, type_name: &str) -> Result<(), Error> {
		let root = self.root_name()?;
		let loaded = self.types.contains_in(type_name, &root);
		if !loaded && !self.files.get(&root)?.has_type_descriptor(type_name) {
			return Ok(());
		}

		let sync = SyncTypeName::snapshot(self, type_name);
		let mut transaction: Transaction<Project, Error> = Transaction::new();
		if loaded {
			transaction.push_intercepted(UnloadTypeDescriptor::new(root.clone(), type_name), UpdateDuplicateMarks::new(type_name));
		}
		transaction.push(RemoveTypeDescriptorFromFile::new(root.clone(), type_name)).push(sync);
		transaction.commit(self)?;
		tracing::debug!(module = %root, type_name, "removed root binding type");
		Ok(())
	}

	/// First registered descriptor for `type_name`.
	pub fn type_descriptor(&self, type_name: &str) -> Result<&BindingTypeDescriptor, Error> {
		Ok(self.types.get(type_name)?)
	}

	/// Descriptor `module` registered for `type_name`.
	pub fn module_type_descriptor(&self, type_name: &str, module: &str) -> Result<&BindingTypeDescriptor, Error> {
		Ok(self.types.get_in(type_name, module)?)
	}

	/// Every descriptor registered for `type_name`, in registration order.
	pub fn type_descriptors(&self, type_name: &str) -> Vec<&BindingTypeDescriptor> {
		self.types.get_all(type_name)
	}

	pub fn module_type_descriptors(&self, module: &str) -> Vec<&BindingTypeDescriptor> {
		self.types.module_descriptors(module)
	}

	pub fn has_type_descriptor(&self, type_name: &str) -> bool {
		self.types.contains(type_name)
	}

	pub(crate) fn load_module_types_transaction(&self, module: &str) -> Result<Transaction<Project, Error>, Error> {
		let declared: Vec<BindingTypeDescriptor> = self.files.get(module)?.type_descriptors().into_iter().cloned().collect();
		let names: IndexSet<&str> = declared.iter().map(BindingTypeDescriptor::type_name).collect();
		let syncs: Vec<SyncTypeName> = names.iter().map(|name| SyncTypeName::snapshot(self, *name)).collect();

		let mut transaction: Transaction<Project, Error> = Transaction::new();
		for descriptor in &declared {
			transaction.push_intercepted(
				LoadTypeDescriptor::new(module, descriptor.clone()),
				UpdateDuplicateMarks::new(descriptor.type_name()),
			);
		}
		for sync in syncs {
			transaction.push(sync);
		}
		Ok(transaction)
	}

	pub(crate) fn unload_module_types_transaction(&self, module: &str) -> Result<Transaction<Project, Error>, Error> {
		let names: Vec<String> = self
			.types
			.module_descriptors(module)
			.into_iter()
			.map(|descriptor| descriptor.type_name().to_string())
			.collect();
		let syncs: Vec<SyncTypeName> = names.iter().map(|name| SyncTypeName::snapshot(self, name.as_str())).collect();

		let mut transaction: Transaction<Project, Error> = Transaction::new();
		for name in &names {
			transaction.push_intercepted(UnloadTypeDescriptor::new(module, name.as_str()), UpdateDuplicateMarks::new(name.as_str()));
		}
		for sync in syncs {
			transaction.push(sync);
		}
		Ok(transaction)
	}
}
