use manifold_index::{CompositeIndex, IndexError, RemovedEntry};

use super::{BindingTypeDescriptor, DiscoveryError};

/// Loaded binding-type descriptors keyed by (type name, defining module).
///
/// Lookups by type name alone return the first registered descriptor, so the
/// answer does not depend on which module registered later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTypeRegistry {
	index: CompositeIndex<BindingTypeDescriptor>,
}

impl BindingTypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a loaded descriptor, replacing the one its module registered before.
	///
	/// # Errors
	///
	/// Returns [`DiscoveryError::NotLoaded`] if the descriptor has no module.
	pub fn set(&mut self, descriptor: BindingTypeDescriptor) -> Result<Option<BindingTypeDescriptor>, DiscoveryError> {
		let Some(module) = descriptor.module_name().map(str::to_string) else {
			return Err(DiscoveryError::NotLoaded {
				type_name: descriptor.type_name().to_string(),
			});
		};
		Ok(self.index.set(descriptor.type_name().to_string(), module, descriptor))
	}

	/// First registered descriptor for `type_name`.
	pub fn get(&self, type_name: &str) -> Result<&BindingTypeDescriptor, IndexError> {
		self.index.first(type_name)
	}

	pub fn get_in(&self, type_name: &str, module: &str) -> Result<&BindingTypeDescriptor, IndexError> {
		self.index.get(type_name, module)
	}

	/// Every descriptor for `type_name` in registration order.
	pub fn get_all(&self, type_name: &str) -> Vec<&BindingTypeDescriptor> {
		self.index
			.list_by_primary(type_name)
			.map(|bucket| bucket.values().collect())
			.unwrap_or_default()
	}

	/// First enabled descriptor for `type_name`.
	pub fn enabled(&self, type_name: &str) -> Option<&BindingTypeDescriptor> {
		self.get_all(type_name).into_iter().find(|descriptor| descriptor.is_enabled())
	}

	pub fn contains(&self, type_name: &str) -> bool {
		self.index.contains(type_name)
	}

	pub fn contains_in(&self, type_name: &str, module: &str) -> bool {
		self.index.contains_entry(type_name, module)
	}

	/// Descriptors defined by `module` in registration order.
	pub fn module_descriptors(&self, module: &str) -> Vec<&BindingTypeDescriptor> {
		self.index
			.iter()
			.filter(|(_, defining, _)| *defining == module)
			.map(|(_, _, descriptor)| descriptor)
			.collect()
	}

	pub fn type_names(&self) -> Vec<&str> {
		self.index.primary_keys()
	}

	pub fn descriptors(&self) -> impl Iterator<Item = &BindingTypeDescriptor> + '_ {
		self.index.values()
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub(crate) fn take(&mut self, type_name: &str, module: &str) -> Option<RemovedEntry<BindingTypeDescriptor>> {
		self.index.take(type_name, module)
	}

	pub(crate) fn restore(&mut self, entry: RemovedEntry<BindingTypeDescriptor>) {
		self.index.restore(entry);
	}

	/// Flags every descriptor of `type_name` as duplicate iff more than one
	/// module defines it.
	pub fn update_duplicate_marks(&mut self, type_name: &str) {
		let count = self.get_all(type_name).len();
		let Ok(descriptors) = self.index.values_by_primary_mut(type_name) else {
			return;
		};
		for descriptor in descriptors {
			descriptor.set_duplicate(count > 1);
		}
		tracing::trace!(type_name, count, "updated duplicate marks");
	}
}
