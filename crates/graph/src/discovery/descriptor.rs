use super::DiscoveryError;

/// Parameter accepted by bindings of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingParameter {
	name: String,
	required: bool,
	default: Option<String>,
}

impl BindingParameter {
	pub fn required(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			required: true,
			default: None,
		}
	}

	pub fn optional(name: impl Into<String>, default: Option<String>) -> Self {
		Self {
			name: name.into(),
			required: false,
			default,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	pub fn default_value(&self) -> Option<&str> {
		self.default.as_deref()
	}
}

/// Type definition as registered with a [`super::DiscoverySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingType {
	pub name: String,
	pub description: Option<String>,
	pub parameters: Vec<BindingParameter>,
}

/// A binding type declared by a module.
///
/// Descriptors are declared unloaded in a module file. Loading records the
/// defining module; the duplicate flag is maintained by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTypeDescriptor {
	type_name: String,
	description: Option<String>,
	parameters: Vec<BindingParameter>,
	module: Option<String>,
	duplicate: bool,
}

impl BindingTypeDescriptor {
	/// # Errors
	///
	/// Returns [`DiscoveryError::InvalidTypeName`] for blank names.
	pub fn new(type_name: impl Into<String>) -> Result<Self, DiscoveryError> {
		let type_name = type_name.into();
		if type_name.trim().is_empty() {
			return Err(DiscoveryError::InvalidTypeName { type_name });
		}
		Ok(Self {
			type_name,
			description: None,
			parameters: Vec::new(),
			module: None,
			duplicate: false,
		})
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_parameter(mut self, parameter: BindingParameter) -> Self {
		self.parameters.push(parameter);
		self
	}

	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn parameters(&self) -> &[BindingParameter] {
		&self.parameters
	}

	pub fn parameter(&self, name: &str) -> Option<&BindingParameter> {
		self.parameters.iter().find(|parameter| parameter.name == name)
	}

	pub fn load(&mut self, module: &str) -> Result<(), DiscoveryError> {
		if self.module.is_some() {
			return Err(DiscoveryError::AlreadyLoaded {
				type_name: self.type_name.clone(),
			});
		}
		self.module = Some(module.to_string());
		Ok(())
	}

	/// Clears the defining module and the duplicate flag.
	pub fn unload(&mut self) -> Result<(), DiscoveryError> {
		if self.module.take().is_none() {
			return Err(DiscoveryError::NotLoaded {
				type_name: self.type_name.clone(),
			});
		}
		self.duplicate = false;
		Ok(())
	}

	pub fn is_loaded(&self) -> bool {
		self.module.is_some()
	}

	/// Defining module, once loaded.
	pub fn module_name(&self) -> Option<&str> {
		self.module.as_deref()
	}

	pub fn is_duplicate(&self) -> bool {
		self.duplicate
	}

	pub(crate) fn set_duplicate(&mut self, duplicate: bool) {
		self.duplicate = duplicate;
	}

	/// Loaded and not shadowed by a descriptor of another module.
	pub fn is_enabled(&self) -> bool {
		self.is_loaded() && !self.duplicate
	}

	pub fn to_binding_type(&self) -> BindingType {
		BindingType {
			name: self.type_name.clone(),
			description: self.description.clone(),
			parameters: self.parameters.clone(),
		}
	}

	/// Same declaration, unloaded.
	pub fn declaration(&self) -> Self {
		Self {
			module: None,
			duplicate: false,
			..self.clone()
		}
	}
}
