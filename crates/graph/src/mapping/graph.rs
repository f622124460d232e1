use indexmap::{IndexMap, IndexSet};

use super::reference::normalize_repository_path;
use super::{ConflictId, FilesystemProbe, LoadError, MappingError, MappingId, PathConflict, PathMapping};
use crate::module::{Module, ModuleProvider};

/// Arena owning path mappings and the conflicts between them.
///
/// # Invariants
///
/// - A mapping holds conflict `c` at path `p` iff `c` has path `p` and lists the mapping.
/// - A mapping holds at most one conflict per repository path.
/// - Only loaded mappings hold conflicts.
/// - A conflict that loses its last member is dropped.
#[derive(Debug, Clone, Default)]
pub struct MappingGraph {
	mappings: IndexMap<MappingId, PathMapping>,
	conflicts: IndexMap<ConflictId, PathConflict>,
	next_mapping: u64,
	next_conflict: u64,
}

impl MappingGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes ownership of a mapping. Conflicts it may carry are discarded.
	pub fn insert(&mut self, mut mapping: PathMapping) -> MappingId {
		mapping.forget_conflicts();
		let id = MappingId(self.next_mapping);
		self.next_mapping += 1;
		self.mappings.insert(id, mapping);
		id
	}

	/// Puts a previously removed mapping back under its old id.
	pub(crate) fn restore(&mut self, id: MappingId, mut mapping: PathMapping) {
		mapping.forget_conflicts();
		self.next_mapping = self.next_mapping.max(id.0 + 1);
		self.mappings.insert(id, mapping);
	}

	/// Releases a mapping after detaching it from every conflict.
	///
	/// The returned mapping keeps its load state.
	pub fn remove(&mut self, id: MappingId) -> Result<PathMapping, MappingError> {
		self.detach_all(id)?;
		self.mappings.shift_remove(&id).ok_or(MappingError::UnknownMapping(id))
	}

	pub fn mapping(&self, id: MappingId) -> Result<&PathMapping, MappingError> {
		self.mappings.get(&id).ok_or(MappingError::UnknownMapping(id))
	}

	pub fn contains(&self, id: MappingId) -> bool {
		self.mappings.contains_key(&id)
	}

	pub fn mappings(&self) -> impl Iterator<Item = (MappingId, &PathMapping)> + '_ {
		self.mappings.iter().map(|(id, mapping)| (*id, mapping))
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}

	/// Loads the mapping against `owner`. See [`PathMapping::load`].
	pub fn load(&mut self, id: MappingId, owner: &Module, modules: &dyn ModuleProvider, fs: &dyn FilesystemProbe) -> Result<Vec<LoadError>, MappingError> {
		self.mappings.get_mut(&id).ok_or(MappingError::UnknownMapping(id))?.load(owner, modules, fs)
	}

	/// Detaches every conflict of the mapping, then unloads it.
	///
	/// # Errors
	///
	/// Returns [`MappingError::NotLoaded`] if the mapping is not loaded.
	pub fn unload(&mut self, id: MappingId) -> Result<(), MappingError> {
		self.mapping(id)?.require_loaded()?;
		self.detach_all(id)?;
		self.mappings.get_mut(&id).ok_or(MappingError::UnknownMapping(id))?.unload()
	}

	/// Creates an empty conflict at `repository_path`.
	pub fn create_conflict(&mut self, repository_path: &str) -> Result<ConflictId, MappingError> {
		let repository_path = normalize_repository_path(repository_path)?;
		let id = ConflictId(self.next_conflict);
		self.next_conflict += 1;
		self.conflicts.insert(id, PathConflict::new(repository_path));
		Ok(id)
	}

	pub fn conflict(&self, id: ConflictId) -> Result<&PathConflict, MappingError> {
		self.conflicts.get(&id).ok_or(MappingError::UnknownConflict(id))
	}

	pub fn conflicts(&self) -> impl Iterator<Item = (ConflictId, &PathConflict)> + '_ {
		self.conflicts.iter().map(|(id, conflict)| (*id, conflict))
	}

	/// Conflicts registered at exactly `repository_path`.
	pub fn conflicts_at<'a>(&'a self, repository_path: &'a str) -> impl Iterator<Item = ConflictId> + 'a {
		self.conflicts
			.iter()
			.filter(move |(_, conflict)| conflict.repository_path() == repository_path)
			.map(|(id, _)| *id)
	}

	/// Attaches `conflict` to `mapping` in both directions.
	///
	/// A different conflict already attached at the same repository path is
	/// detached first. Attaching the same conflict again is a no-op.
	///
	/// # Errors
	///
	/// - [`MappingError::NotLoaded`] if the mapping is not loaded.
	/// - [`MappingError::ConflictPathMismatch`] if the conflict's path is
	///   neither the mapping's path nor one it produces.
	pub fn add_conflict(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<(), MappingError> {
		let target = self.mapping(mapping)?;
		target.require_loaded()?;
		let conflict_path = self.conflict(conflict)?.repository_path().to_string();
		if !target.covers(&conflict_path) {
			return Err(MappingError::ConflictPathMismatch {
				conflict_path,
				repository_path: target.repository_path().to_string(),
			});
		}

		match target.conflict_at(&conflict_path) {
			Some(existing) if existing == conflict => return Ok(()),
			Some(existing) => self.detach(mapping, existing),
			None => {}
		}

		if let Some(target) = self.mappings.get_mut(&mapping) {
			target.set_conflict(conflict_path, conflict);
		}
		if let Some(entry) = self.conflicts.get_mut(&conflict) {
			entry.attach(mapping);
		}
		Ok(())
	}

	/// Detaches `conflict` from `mapping` in both directions; no-op if not attached.
	///
	/// # Errors
	///
	/// Returns [`MappingError::NotLoaded`] if the mapping is not loaded.
	pub fn remove_conflict(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<(), MappingError> {
		let target = self.mapping(mapping)?;
		target.require_loaded()?;
		let Some(entry) = self.conflicts.get(&conflict) else {
			return Ok(());
		};
		if target.conflict_at(entry.repository_path()) == Some(conflict) {
			self.detach(mapping, conflict);
		}
		Ok(())
	}

	/// Detaches and drops every conflict.
	pub fn clear_conflicts(&mut self) {
		for mapping in self.mappings.values_mut() {
			mapping.forget_conflicts();
		}
		self.conflicts.clear();
	}

	/// Other mappings sharing any conflict with `mapping`, de-duplicated.
	pub fn conflicting_mappings(&self, mapping: MappingId) -> Result<Vec<MappingId>, MappingError> {
		let mut others = IndexSet::new();
		for conflict in self.mapping(mapping)?.conflict_ids() {
			let Some(conflict) = self.conflicts.get(&conflict) else {
				continue;
			};
			others.extend(conflict.mappings().filter(|other| *other != mapping));
		}
		Ok(others.into_iter().collect())
	}

	/// Owning modules of [`Self::conflicting_mappings`], de-duplicated.
	pub fn conflicting_modules(&self, mapping: MappingId) -> Result<Vec<String>, MappingError> {
		let mut modules = IndexSet::new();
		for other in self.conflicting_mappings(mapping)? {
			if let Ok(name) = self.mapping(other)?.module_name() {
				modules.insert(name.to_string());
			}
		}
		Ok(modules.into_iter().collect())
	}

	fn detach_all(&mut self, mapping: MappingId) -> Result<(), MappingError> {
		for conflict in self.mapping(mapping)?.conflict_ids() {
			self.detach(mapping, conflict);
		}
		Ok(())
	}

	fn detach(&mut self, mapping: MappingId, conflict: ConflictId) {
		let Some(entry) = self.conflicts.get_mut(&conflict) else {
			return;
		};
		entry.detach(mapping);
		let path = entry.repository_path().to_string();
		if entry.is_empty() {
			self.conflicts.shift_remove(&conflict);
			tracing::trace!(repository_path = %path, "dropped empty conflict");
		}
		if let Some(target) = self.mappings.get_mut(&mapping) {
			target.clear_conflict(&path);
		}
	}
}
