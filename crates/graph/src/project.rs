use crate::config::ManifoldConfig;
use crate::discovery::{BindingTypeRegistry, DiscoverySink};
use crate::file::{ModuleFiles, PersistedModuleFile};
use crate::mapping::FilesystemProbe;
use crate::module::{Module, ModuleGraph, ModuleProvider, OverrideGraph};
use crate::repository::PathMappingRegistry;
use crate::{ConfigError, Error};

/// Modules, their files and the registries built from them.
///
/// # Purpose
///
/// `Project` is the context every operation mutates. Binding-type methods
/// live in [`crate::discovery`], path-mapping methods in
/// [`crate::repository`].
///
/// # Invariants
///
/// - Every module in the graph has a module file.
/// - The override graph held by the mapping registry reflects the module
///   graph and [`ManifoldConfig::override_order`].
pub struct Project {
	pub(crate) config: ManifoldConfig,
	pub(crate) modules: ModuleGraph,
	pub(crate) files: ModuleFiles,
	pub(crate) types: BindingTypeRegistry,
	pub(crate) sink: Box<dyn DiscoverySink>,
	pub(crate) mappings: PathMappingRegistry,
	pub(crate) filesystem: Box<dyn FilesystemProbe>,
}

impl Project {
	/// # Errors
	///
	/// Returns [`ConfigError::RepeatedModule`] for an invalid override order.
	pub fn new(config: ManifoldConfig, sink: impl DiscoverySink + 'static, filesystem: impl FilesystemProbe + 'static) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self {
			config,
			modules: ModuleGraph::new(),
			files: ModuleFiles::new(),
			types: BindingTypeRegistry::new(),
			sink: Box::new(sink),
			mappings: PathMappingRegistry::default(),
			filesystem: Box::new(filesystem),
		})
	}

	/// Adds the root module together with its file.
	pub fn add_root_module(&mut self, module: Module, file: impl PersistedModuleFile + 'static) -> Result<(), Error> {
		self.attach_module(module, Box::new(file), true)
	}

	/// Adds a non-root module together with its file.
	///
	/// The module's declarations are not loaded; see
	/// [`Self::load_module`].
	///
	/// # Errors
	///
	/// Fails if the name is taken or the module's override declarations
	/// contradict existing ones. The project is left unchanged.
	pub fn add_module(&mut self, module: Module, file: impl PersistedModuleFile + 'static) -> Result<(), Error> {
		self.attach_module(module, Box::new(file), false)
	}

	/// Removes a module after unloading its declarations.
	pub fn remove_module(&mut self, name: &str) -> Result<(), Error> {
		self.modules.module_by_name(name)?;
		self.unload_module(name)?;
		self.modules.remove(name);
		self.files.remove(name);
		self.rebuild_overrides()?;
		tracing::debug!(module = name, "removed module");
		Ok(())
	}

	/// Loads the binding types and path mappings a module declares.
	///
	/// Both halves commit together: if loading the mappings fails, the loaded
	/// binding types are rolled back as well.
	pub fn load_module(&mut self, name: &str) -> Result<(), Error> {
		let types = self.load_module_types_transaction(name)?.commit(self)?;
		let mappings = match self.load_module_mappings_transaction(name) {
			Ok(transaction) => transaction.commit(self),
			Err(error) => Err(error),
		};
		if let Err(error) = mappings {
			tracing::warn!(module = name, %error, "loading module mappings failed, unloading its types");
			types.rollback(self);
			return Err(error);
		}
		tracing::debug!(module = name, "loaded module");
		Ok(())
	}

	/// Unloads the binding types and path mappings of a module.
	pub fn unload_module(&mut self, name: &str) -> Result<(), Error> {
		let types = self.unload_module_types_transaction(name)?.commit(self)?;
		let mappings = match self.unload_module_mappings_transaction(name) {
			Ok(transaction) => transaction.commit(self),
			Err(error) => Err(error),
		};
		if let Err(error) = mappings {
			tracing::warn!(module = name, %error, "unloading module mappings failed, reloading its types");
			types.rollback(self);
			return Err(error);
		}
		tracing::debug!(module = name, "unloaded module");
		Ok(())
	}

	pub fn config(&self) -> &ManifoldConfig {
		&self.config
	}

	pub fn modules(&self) -> &ModuleGraph {
		&self.modules
	}

	pub fn root_module(&self) -> Option<&Module> {
		self.modules.root()
	}

	pub fn files(&self) -> &ModuleFiles {
		&self.files
	}

	pub fn module_file(&self, module: &str) -> Result<&dyn PersistedModuleFile, Error> {
		Ok(self.files.get(module)?)
	}

	pub fn binding_types(&self) -> &BindingTypeRegistry {
		&self.types
	}

	pub fn sink(&self) -> &dyn DiscoverySink {
		self.sink.as_ref()
	}

	pub fn path_mapping_registry(&self) -> &PathMappingRegistry {
		&self.mappings
	}

	pub fn overrides(&self) -> &OverrideGraph {
		self.mappings.overrides()
	}

	pub(crate) fn root_name(&self) -> Result<String, Error> {
		self.modules.root_name().map(str::to_string).ok_or(Error::NoRootModule)
	}

	fn attach_module(&mut self, module: Module, file: Box<dyn PersistedModuleFile>, root: bool) -> Result<(), Error> {
		let name = module.name().to_string();
		if root {
			self.modules.insert_root(module)?;
		} else {
			self.modules.insert(module)?;
		}

		if let Err(error) = self.rebuild_overrides() {
			self.modules.remove(&name);
			return Err(error);
		}
		self.files.insert(name.clone(), file);
		tracing::debug!(module = %name, root, "added module");
		Ok(())
	}

	/// Recomputes the override graph and the conflicts that depend on it.
	fn rebuild_overrides(&mut self) -> Result<(), Error> {
		let overrides = OverrideGraph::for_modules(&self.modules, &self.config.override_order)?;
		self.mappings.set_overrides(overrides);
		self.mappings.refresh_conflicts();
		Ok(())
	}
}

impl std::fmt::Debug for Project {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Project")
			.field("config", &self.config)
			.field("modules", &self.modules)
			.field("files", &self.files)
			.field("types", &self.types)
			.field("mappings", &self.mappings)
			.finish_non_exhaustive()
	}
}
