//! Persisted per-module declarations.
//!
//! Every module owns one file listing the binding types and path mappings it
//! declares. Declarations are stored unloaded; loading happens in the
//! registries. Parsing and serialization belong to the implementor.

use indexmap::IndexMap;
use thiserror::Error;

use crate::discovery::BindingTypeDescriptor;
use crate::mapping::PathMapping;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
	#[error("no module file for module {module}")]
	NoModuleFile { module: String },
	#[error("failed to write module file of {module}: {reason}")]
	Write { module: String, reason: String },
}

/// Storage of one module's declarations.
pub trait PersistedModuleFile {
	fn has_type_descriptor(&self, type_name: &str) -> bool;

	fn type_descriptor(&self, type_name: &str) -> Option<&BindingTypeDescriptor>;

	/// Declared descriptors in declaration order.
	fn type_descriptors(&self) -> Vec<&BindingTypeDescriptor>;

	/// Adds a descriptor, replacing one declared under the same type name.
	fn add_type_descriptor(&mut self, descriptor: BindingTypeDescriptor) -> Result<(), FileError>;

	/// Removes the descriptor for `type_name`, returning it with its former
	/// position. Returns `None` if absent.
	fn remove_type_descriptor(&mut self, type_name: &str) -> Result<Option<(usize, BindingTypeDescriptor)>, FileError>;

	/// Declares a descriptor at `position`, shifting later declarations.
	///
	/// Positions past the end append.
	fn restore_type_descriptor(&mut self, position: usize, descriptor: BindingTypeDescriptor) -> Result<(), FileError>;

	fn has_path_mapping(&self, repository_path: &str) -> bool;

	fn path_mapping(&self, repository_path: &str) -> Option<&PathMapping>;

	/// Declared mappings in declaration order.
	fn path_mappings(&self) -> Vec<&PathMapping>;

	/// Adds a mapping, replacing one declared for the same repository path.
	fn add_path_mapping(&mut self, mapping: PathMapping) -> Result<(), FileError>;

	/// Removes the mapping for `repository_path`, returning it with its
	/// former position. Returns `None` if absent.
	fn remove_path_mapping(&mut self, repository_path: &str) -> Result<Option<(usize, PathMapping)>, FileError>;

	/// Declares a mapping at `position`, shifting later declarations.
	///
	/// Positions past the end append.
	fn restore_path_mapping(&mut self, position: usize, mapping: PathMapping) -> Result<(), FileError>;
}

/// [`PersistedModuleFile`] kept in memory.
///
/// Equality compares declaration order as well as contents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModuleFile {
	types: IndexMap<String, BindingTypeDescriptor>,
	mappings: IndexMap<String, PathMapping>,
}

impl PartialEq for InMemoryModuleFile {
	fn eq(&self, other: &Self) -> bool {
		self.types.iter().eq(other.types.iter()) && self.mappings.iter().eq(other.mappings.iter())
	}
}

impl Eq for InMemoryModuleFile {}

impl InMemoryModuleFile {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_type_descriptor(mut self, descriptor: BindingTypeDescriptor) -> Self {
		self.types.insert(descriptor.type_name().to_string(), descriptor.declaration());
		self
	}

	pub fn with_path_mapping(mut self, mapping: PathMapping) -> Self {
		self.mappings.insert(mapping.repository_path().to_string(), mapping.declaration());
		self
	}
}

impl PersistedModuleFile for InMemoryModuleFile {
	fn has_type_descriptor(&self, type_name: &str) -> bool {
		self.types.contains_key(type_name)
	}

	fn type_descriptor(&self, type_name: &str) -> Option<&BindingTypeDescriptor> {
		self.types.get(type_name)
	}

	fn type_descriptors(&self) -> Vec<&BindingTypeDescriptor> {
		self.types.values().collect()
	}

	fn add_type_descriptor(&mut self, descriptor: BindingTypeDescriptor) -> Result<(), FileError> {
		self.types.insert(descriptor.type_name().to_string(), descriptor.declaration());
		Ok(())
	}

	fn remove_type_descriptor(&mut self, type_name: &str) -> Result<Option<(usize, BindingTypeDescriptor)>, FileError> {
		Ok(self.types.shift_remove_full(type_name).map(|(position, _, descriptor)| (position, descriptor)))
	}

	fn restore_type_descriptor(&mut self, position: usize, descriptor: BindingTypeDescriptor) -> Result<(), FileError> {
		let position = position.min(self.types.len());
		self.types.shift_insert(position, descriptor.type_name().to_string(), descriptor.declaration());
		Ok(())
	}

	fn has_path_mapping(&self, repository_path: &str) -> bool {
		self.mappings.contains_key(repository_path)
	}

	fn path_mapping(&self, repository_path: &str) -> Option<&PathMapping> {
		self.mappings.get(repository_path)
	}

	fn path_mappings(&self) -> Vec<&PathMapping> {
		self.mappings.values().collect()
	}

	fn add_path_mapping(&mut self, mapping: PathMapping) -> Result<(), FileError> {
		self.mappings.insert(mapping.repository_path().to_string(), mapping.declaration());
		Ok(())
	}

	fn remove_path_mapping(&mut self, repository_path: &str) -> Result<Option<(usize, PathMapping)>, FileError> {
		Ok(self.mappings.shift_remove_full(repository_path).map(|(position, _, mapping)| (position, mapping)))
	}

	fn restore_path_mapping(&mut self, position: usize, mapping: PathMapping) -> Result<(), FileError> {
		let position = position.min(self.mappings.len());
		self.mappings.shift_insert(position, mapping.repository_path().to_string(), mapping.declaration());
		Ok(())
	}
}

/// Module files keyed by module name.
#[derive(Default)]
pub struct ModuleFiles {
	files: IndexMap<String, Box<dyn PersistedModuleFile>>,
}

impl ModuleFiles {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the file of `module`, returning the one it replaces.
	pub fn insert(&mut self, module: impl Into<String>, file: Box<dyn PersistedModuleFile>) -> Option<Box<dyn PersistedModuleFile>> {
		self.files.insert(module.into(), file)
	}

	pub fn remove(&mut self, module: &str) -> Option<Box<dyn PersistedModuleFile>> {
		self.files.shift_remove(module)
	}

	pub fn get(&self, module: &str) -> Result<&dyn PersistedModuleFile, FileError> {
		self.files
			.get(module)
			.map(|file| &**file)
			.ok_or_else(|| FileError::NoModuleFile { module: module.to_string() })
	}

	pub fn get_mut(&mut self, module: &str) -> Result<&mut dyn PersistedModuleFile, FileError> {
		match self.files.get_mut(module) {
			Some(file) => Ok(&mut **file),
			None => Err(FileError::NoModuleFile { module: module.to_string() }),
		}
	}

	pub fn contains(&self, module: &str) -> bool {
		self.files.contains_key(module)
	}

	pub fn modules(&self) -> impl Iterator<Item = &str> + '_ {
		self.files.keys().map(String::as_str)
	}
}

impl std::fmt::Debug for ModuleFiles {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModuleFiles").field("modules", &self.files.keys().collect::<Vec<_>>()).finish()
	}
}
