//! Modules and the graph that owns them.
//!
//! A [`Module`] is a named unit with a root directory and a list of modules it
//! overrides. [`ModuleGraph`] owns every module and optionally marks one of
//! them as the root module. Other components never hold a module directly;
//! they keep its name and resolve it through a [`ModuleProvider`] when needed.

mod conflict;
mod error;
mod overrides;

use std::path::{Path, PathBuf};

pub use conflict::{ConflictDetector, ModuleConflict};
pub use error::ModuleError;
use indexmap::IndexMap;
pub use overrides::OverrideGraph;

/// A named unit contributing path mappings and binding types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
	name: String,
	root_dir: PathBuf,
	overrides: Vec<String>,
}

impl Module {
	pub fn new(name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
		Self {
			name: name.into(),
			root_dir: root_dir.into(),
			overrides: Vec::new(),
		}
	}

	/// Declares the modules this one overrides.
	pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.overrides = overrides.into_iter().map(Into::into).collect();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Directory that module-relative path references resolve against.
	pub fn root_dir(&self) -> &Path {
		&self.root_dir
	}

	/// Names of the modules this one overrides, in declared order.
	pub fn overrides(&self) -> &[String] {
		&self.overrides
	}
}

/// Read access to modules by name.
pub trait ModuleProvider {
	fn module_by_name(&self, name: &str) -> Result<&Module, ModuleError>;

	fn root_dir_of(&self, name: &str) -> Result<&Path, ModuleError> {
		Ok(self.module_by_name(name)?.root_dir())
	}

	fn overridden_modules_of(&self, name: &str) -> Result<&[String], ModuleError> {
		Ok(self.module_by_name(name)?.overrides())
	}
}

/// Owns every known module; at most one is the root module.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
	modules: IndexMap<String, Module>,
	root: Option<String>,
}

impl ModuleGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a module.
	///
	/// # Errors
	///
	/// Returns [`ModuleError::Duplicate`] if a module with the same name exists.
	pub fn insert(&mut self, module: Module) -> Result<(), ModuleError> {
		if self.modules.contains_key(module.name()) {
			return Err(ModuleError::Duplicate { name: module.name.clone() });
		}
		self.modules.insert(module.name.clone(), module);
		Ok(())
	}

	/// Adds a module and marks it as the root module.
	///
	/// # Errors
	///
	/// Returns [`ModuleError::RootAlreadySet`] if a root module exists, or
	/// [`ModuleError::Duplicate`] if the name is taken.
	pub fn insert_root(&mut self, module: Module) -> Result<(), ModuleError> {
		if let Some(existing) = &self.root {
			return Err(ModuleError::RootAlreadySet {
				existing: existing.clone(),
				name: module.name.clone(),
			});
		}
		let name = module.name.clone();
		self.insert(module)?;
		self.root = Some(name);
		Ok(())
	}

	/// Removes a module, clearing the root marker if it was the root.
	pub fn remove(&mut self, name: &str) -> Option<Module> {
		let module = self.modules.shift_remove(name)?;
		if self.root.as_deref() == Some(name) {
			self.root = None;
		}
		Some(module)
	}

	pub fn get(&self, name: &str) -> Option<&Module> {
		self.modules.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.modules.contains_key(name)
	}

	pub fn root(&self) -> Option<&Module> {
		self.root.as_deref().and_then(|name| self.modules.get(name))
	}

	pub fn root_name(&self) -> Option<&str> {
		self.root.as_deref()
	}

	pub fn is_root(&self, name: &str) -> bool {
		self.root.as_deref() == Some(name)
	}

	/// Module names in insertion order.
	pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
		self.modules.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Module> + '_ {
		self.modules.values()
	}

	pub fn len(&self) -> usize {
		self.modules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}

impl ModuleProvider for ModuleGraph {
	fn module_by_name(&self, name: &str) -> Result<&Module, ModuleError> {
		self.modules.get(name).ok_or_else(|| ModuleError::NotFound { name: name.to_string() })
	}
}
