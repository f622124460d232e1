use indexmap::IndexMap;

use super::{BindingType, BindingTypeDescriptor, DiscoveryError};

/// External discovery registry that enabled binding types are published to.
pub trait DiscoverySink {
	/// # Errors
	///
	/// Implementations reject a type whose name is already defined.
	fn add_binding_type(&mut self, binding_type: BindingType) -> Result<(), DiscoveryError>;

	/// Removes a defined type, returning its position in definition order
	/// together with the type.
	fn remove_binding_type(&mut self, type_name: &str) -> Result<(usize, BindingType), DiscoveryError>;

	/// Defines a type at `position` in definition order, shifting later types.
	///
	/// Positions past the end append.
	fn restore_binding_type(&mut self, position: usize, binding_type: BindingType) -> Result<(), DiscoveryError>;

	fn has_binding_type(&self, type_name: &str) -> bool;

	fn binding_type(&self, type_name: &str) -> Option<&BindingType>;

	/// Every defined type in definition order.
	fn binding_types(&self) -> Vec<&BindingType>;

	fn define_type(&mut self, descriptor: &BindingTypeDescriptor) -> Result<(), DiscoveryError> {
		self.add_binding_type(descriptor.to_binding_type())
	}

	fn undefine_type(&mut self, type_name: &str) -> Result<(usize, BindingType), DiscoveryError> {
		self.remove_binding_type(type_name)
	}
}

/// [`DiscoverySink`] kept in memory.
///
/// Equality compares definition order as well as contents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiscovery {
	types: IndexMap<String, BindingType>,
}

impl PartialEq for InMemoryDiscovery {
	fn eq(&self, other: &Self) -> bool {
		self.types.iter().eq(other.types.iter())
	}
}

impl Eq for InMemoryDiscovery {}

impl InMemoryDiscovery {
	pub fn new() -> Self {
		Self::default()
	}
}

impl DiscoverySink for InMemoryDiscovery {
	fn add_binding_type(&mut self, binding_type: BindingType) -> Result<(), DiscoveryError> {
		if self.types.contains_key(&binding_type.name) {
			return Err(DiscoveryError::TypeAlreadyDefined { type_name: binding_type.name });
		}
		self.types.insert(binding_type.name.clone(), binding_type);
		Ok(())
	}

	fn remove_binding_type(&mut self, type_name: &str) -> Result<(usize, BindingType), DiscoveryError> {
		self.types
			.shift_remove_full(type_name)
			.map(|(position, _, binding_type)| (position, binding_type))
			.ok_or_else(|| DiscoveryError::TypeNotDefined { type_name: type_name.to_string() })
	}

	fn restore_binding_type(&mut self, position: usize, binding_type: BindingType) -> Result<(), DiscoveryError> {
		if self.types.contains_key(&binding_type.name) {
			return Err(DiscoveryError::TypeAlreadyDefined { type_name: binding_type.name });
		}
		let position = position.min(self.types.len());
		self.types.shift_insert(position, binding_type.name.clone(), binding_type);
		Ok(())
	}

	fn has_binding_type(&self, type_name: &str) -> bool {
		self.types.contains_key(type_name)
	}

	fn binding_type(&self, type_name: &str) -> Option<&BindingType> {
		self.types.get(type_name)
	}

	fn binding_types(&self) -> Vec<&BindingType> {
		self.types.values().collect()
	}
}
