use manifold_index::{IndexError, RemovedEntry};
use manifold_transaction::{AtomicOperation, OperationInterceptor};

use super::{BindingType, BindingTypeDescriptor};
use crate::{Error, Project};

/// Publishes a binding type to the discovery sink.
#[derive(Debug)]
pub struct DefineType {
	descriptor: BindingTypeDescriptor,
}

impl DefineType {
	pub fn new(descriptor: BindingTypeDescriptor) -> Self {
		Self { descriptor }
	}
}

impl AtomicOperation<Project> for DefineType {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		ctx.sink.define_type(&self.descriptor)?;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		if let Err(error) = ctx.sink.undefine_type(self.descriptor.type_name()) {
			tracing::error!(type_name = self.descriptor.type_name(), %error, "failed to undefine binding type");
		}
	}
}

/// Withdraws a binding type from the discovery sink.
///
/// Rollback puts the type back at its former position in definition order.
#[derive(Debug)]
pub struct UndefineType {
	type_name: String,
	previous: Option<(usize, BindingType)>,
}

impl UndefineType {
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			previous: None,
		}
	}
}

impl AtomicOperation<Project> for UndefineType {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		self.previous = Some(ctx.sink.undefine_type(&self.type_name)?);
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		let Some((position, previous)) = self.previous.take() else {
			return;
		};
		if let Err(error) = ctx.sink.restore_binding_type(position, previous) {
			tracing::error!(type_name = %self.type_name, %error, "failed to redefine binding type");
		}
	}
}

/// Adds a descriptor to a module file, restoring a replaced one on rollback.
#[derive(Debug)]
pub struct AddTypeDescriptorToFile {
	module: String,
	descriptor: BindingTypeDescriptor,
	previous: Option<BindingTypeDescriptor>,
}

impl AddTypeDescriptorToFile {
	pub fn new(module: impl Into<String>, descriptor: BindingTypeDescriptor) -> Self {
		Self {
			module: module.into(),
			descriptor,
			previous: None,
		}
	}
}

impl AtomicOperation<Project> for AddTypeDescriptorToFile {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let file = ctx.files.get_mut(&self.module)?;
		self.previous = file.type_descriptor(self.descriptor.type_name()).cloned();
		file.add_type_descriptor(self.descriptor.clone())?;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		let type_name = self.descriptor.type_name();
		let result = ctx.files.get_mut(&self.module).and_then(|file| match self.previous.take() {
			Some(previous) => file.add_type_descriptor(previous),
			None => file.remove_type_descriptor(type_name).map(|_| ()),
		});
		if let Err(error) = result {
			tracing::error!(module = %self.module, type_name, %error, "failed to restore module file");
		}
	}
}

/// Removes a descriptor from a module file, putting it back at its former
/// position on rollback.
#[derive(Debug)]
pub struct RemoveTypeDescriptorFromFile {
	module: String,
	type_name: String,
	previous: Option<(usize, BindingTypeDescriptor)>,
}

impl RemoveTypeDescriptorFromFile {
	pub fn new(module: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			module: module.into(),
			type_name: type_name.into(),
			previous: None,
		}
	}
}

impl AtomicOperation<Project> for RemoveTypeDescriptorFromFile {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		self.previous = ctx.files.get_mut(&self.module)?.remove_type_descriptor(&self.type_name)?;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		let Some((position, previous)) = self.previous.take() else {
			return;
		};
		if let Err(error) = ctx.files.get_mut(&self.module).and_then(|file| file.restore_type_descriptor(position, previous)) {
			tracing::error!(module = %self.module, type_name = %self.type_name, %error, "failed to restore module file");
		}
	}
}

/// Loads a declared descriptor for a module into the registry.
///
/// A descriptor the module registered before is replaced in place and
/// restored on rollback.
#[derive(Debug)]
pub struct LoadTypeDescriptor {
	module: String,
	descriptor: BindingTypeDescriptor,
	previous: Option<BindingTypeDescriptor>,
	loaded: bool,
}

impl LoadTypeDescriptor {
	pub fn new(module: impl Into<String>, descriptor: BindingTypeDescriptor) -> Self {
		Self {
			module: module.into(),
			descriptor: descriptor.declaration(),
			previous: None,
			loaded: false,
		}
	}
}

impl AtomicOperation<Project> for LoadTypeDescriptor {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let mut descriptor = self.descriptor.clone();
		descriptor.load(&self.module)?;
		self.previous = ctx.types.set(descriptor)?;
		self.loaded = true;
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		if !std::mem::take(&mut self.loaded) {
			return;
		}
		let type_name = self.descriptor.type_name();
		let restored = match self.previous.take() {
			Some(previous) => ctx.types.set(previous).map(|_| ()),
			None => {
				ctx.types.take(type_name, &self.module);
				Ok(())
			}
		};
		if let Err(error) = restored {
			tracing::error!(module = %self.module, type_name, %error, "failed to restore binding type registry");
		}
	}
}

/// Takes a loaded descriptor out of the registry.
#[derive(Debug)]
pub struct UnloadTypeDescriptor {
	module: String,
	type_name: String,
	removed: Option<RemovedEntry<BindingTypeDescriptor>>,
}

impl UnloadTypeDescriptor {
	pub fn new(module: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			module: module.into(),
			type_name: type_name.into(),
			removed: None,
		}
	}
}

impl AtomicOperation<Project> for UnloadTypeDescriptor {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let removed = ctx.types.take(&self.type_name, &self.module).ok_or_else(|| IndexError::EntryNotFound {
			primary: self.type_name.clone(),
			secondary: self.module.clone(),
		})?;
		self.removed = Some(removed);
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		if let Some(removed) = self.removed.take() {
			ctx.types.restore(removed);
		}
	}
}

/// Brings the discovery sink in line with the registry for one type name.
///
/// The descriptor enabled for the name is captured when the operation is
/// created, before any other operation of the transaction runs. `execute`
/// compares it with the descriptor enabled at that point and defines,
/// undefines or redefines the type accordingly.
#[derive(Debug)]
pub struct SyncTypeName {
	type_name: String,
	before: Option<BindingTypeDescriptor>,
	applied: Vec<SinkChange>,
}

#[derive(Debug)]
enum SinkChange {
	Define(DefineType),
	Undefine(UndefineType),
}

impl SyncTypeName {
	/// Captures the descriptor currently enabled for `type_name`.
	pub fn snapshot(project: &Project, type_name: impl Into<String>) -> Self {
		let type_name = type_name.into();
		let before = project.types.enabled(&type_name).cloned();
		Self {
			type_name,
			before,
			applied: Vec::new(),
		}
	}

	pub fn type_name(&self) -> &str {
		&self.type_name
	}
}

impl AtomicOperation<Project> for SyncTypeName {
	type Error = Error;

	fn execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		let after = ctx.types.enabled(&self.type_name).cloned();
		let before = self.before.as_ref().map(BindingTypeDescriptor::to_binding_type);
		let now = after.as_ref().map(BindingTypeDescriptor::to_binding_type);
		if before == now {
			return Ok(());
		}

		let mut changes = Vec::with_capacity(2);
		if before.is_some() {
			changes.push(SinkChange::Undefine(UndefineType::new(self.type_name.clone())));
		}
		if let Some(after) = after {
			changes.push(SinkChange::Define(DefineType::new(after)));
		}

		for mut change in changes {
			let result = match &mut change {
				SinkChange::Define(operation) => operation.execute(ctx),
				SinkChange::Undefine(operation) => operation.execute(ctx),
			};
			if let Err(error) = result {
				self.rollback(ctx);
				return Err(error);
			}
			self.applied.push(change);
		}
		tracing::debug!(type_name = %self.type_name, defined = now.is_some(), "synchronized binding type");
		Ok(())
	}

	fn rollback(&mut self, ctx: &mut Project) {
		while let Some(change) = self.applied.pop() {
			match change {
				SinkChange::Define(mut operation) => operation.rollback(ctx),
				SinkChange::Undefine(mut operation) => operation.rollback(ctx),
			}
		}
	}
}

/// Recomputes duplicate marks for one type name.
#[derive(Debug, Clone)]
pub struct UpdateDuplicateMarks {
	type_name: String,
}

impl UpdateDuplicateMarks {
	pub fn new(type_name: impl Into<String>) -> Self {
		Self { type_name: type_name.into() }
	}
}

impl OperationInterceptor<Project> for UpdateDuplicateMarks {
	type Error = Error;

	fn post_execute(&mut self, ctx: &mut Project) -> Result<(), Error> {
		ctx.types.update_duplicate_marks(&self.type_name);
		Ok(())
	}

	fn post_rollback(&mut self, ctx: &mut Project) {
		ctx.types.update_duplicate_marks(&self.type_name);
	}
}
