use manifold_index::{CompositeIndex, IndexError, RemovedEntry};

use crate::mapping::{MappingGraph, MappingId, PathConflict, PathMapping};
use crate::module::{ConflictDetector, OverrideGraph};

/// Conflict at one repository path, described by the competing modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSnapshot {
	pub repository_path: String,
	/// Modules of the conflicting mappings, sorted.
	pub modules: Vec<String>,
}

/// A mapping taken out of the registry, kept for restoring it.
#[derive(Debug)]
pub(crate) struct RemovedMapping {
	entry: RemovedEntry<MappingId>,
	mapping: PathMapping,
}

/// Loaded path mappings keyed by (repository path, module).
///
/// # Invariants
///
/// - Every indexed mapping is loaded and owned by the inner [`MappingGraph`].
/// - Each indexed mapping claims every repository path it lists in the
///   conflict detector, on behalf of its module.
/// - After [`Self::refresh_conflicts`], each repository path claimed by
///   modules that are not ordered by the override graph has exactly one
///   [`PathConflict`], attached to every claiming mapping of those modules.
#[derive(Debug, Clone, Default)]
pub struct PathMappingRegistry {
	graph: MappingGraph,
	index: CompositeIndex<MappingId>,
	detector: ConflictDetector,
}

impl PathMappingRegistry {
	pub fn new(overrides: OverrideGraph) -> Self {
		Self {
			graph: MappingGraph::new(),
			index: CompositeIndex::new(),
			detector: ConflictDetector::new(overrides),
		}
	}

	pub fn graph(&self) -> &MappingGraph {
		&self.graph
	}

	pub fn overrides(&self) -> &OverrideGraph {
		self.detector.overrides()
	}

	pub fn detector(&self) -> &ConflictDetector {
		&self.detector
	}

	pub fn contains(&self, repository_path: &str, module: &str) -> bool {
		self.index.contains_entry(repository_path, module)
	}

	pub fn id_of(&self, repository_path: &str, module: &str) -> Result<MappingId, IndexError> {
		self.index.get(repository_path, module).copied()
	}

	/// Mapping of `module` at `repository_path`.
	pub fn get(&self, repository_path: &str, module: &str) -> Result<&PathMapping, IndexError> {
		let id = self.id_of(repository_path, module)?;
		self.graph.mapping(id).map_err(|_| IndexError::EntryNotFound {
			primary: repository_path.to_string(),
			secondary: module.to_string(),
		})
	}

	/// Mappings at `repository_path` in load order.
	pub fn mappings_at(&self, repository_path: &str) -> Vec<&PathMapping> {
		let Ok(bucket) = self.index.list_by_primary(repository_path) else {
			return Vec::new();
		};
		bucket.values().filter_map(|id| self.graph.mapping(*id).ok()).collect()
	}

	/// Mappings of `module` in load order.
	pub fn module_mappings(&self, module: &str) -> Vec<&PathMapping> {
		self.index
			.iter()
			.filter(|(_, owner, _)| *owner == module)
			.filter_map(|(_, _, id)| self.graph.mapping(*id).ok())
			.collect()
	}

	/// Repository paths with at least one loaded mapping.
	pub fn repository_paths(&self) -> Vec<&str> {
		self.index.primary_keys()
	}

	pub fn conflicts(&self) -> Vec<&PathConflict> {
		self.graph.conflicts().map(|(_, conflict)| conflict).collect()
	}

	/// Every conflict sorted by repository path, independent of ids.
	pub fn conflict_snapshot(&self) -> Vec<ConflictSnapshot> {
		let mut snapshot: Vec<ConflictSnapshot> = self
			.graph
			.conflicts()
			.map(|(_, conflict)| {
				let mut modules: Vec<String> = conflict
					.mappings()
					.filter_map(|id| self.graph.mapping(id).ok())
					.filter_map(|mapping| mapping.module_name().ok())
					.map(str::to_string)
					.collect();
				modules.sort();
				modules.dedup();
				ConflictSnapshot {
					repository_path: conflict.repository_path().to_string(),
					modules,
				}
			})
			.collect();
		snapshot.sort_by(|a, b| a.repository_path.cmp(&b.repository_path));
		snapshot
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub(crate) fn set_overrides(&mut self, overrides: OverrideGraph) {
		self.detector.set_overrides(overrides);
	}

	/// Registers a loaded mapping for `module` and claims its paths.
	pub(crate) fn insert(&mut self, module: &str, mapping: PathMapping) -> MappingId {
		self.claim(module, &mapping);
		let repository_path = mapping.repository_path().to_string();
		let id = self.graph.insert(mapping);
		self.index.set(repository_path, module, id);
		id
	}

	/// Takes the mapping of `module` at `repository_path` out of the registry.
	pub(crate) fn remove(&mut self, repository_path: &str, module: &str) -> Option<RemovedMapping> {
		let entry = self.index.take(repository_path, module)?;
		let mapping = match self.graph.remove(*entry.value()) {
			Ok(mapping) => mapping,
			Err(error) => {
				tracing::error!(repository_path, module, %error, "indexed mapping missing from graph");
				self.index.restore(entry);
				return None;
			}
		};
		self.release(module, &mapping);
		Some(RemovedMapping { entry, mapping })
	}

	/// Puts back a mapping taken with [`Self::remove`] under its old id and position.
	pub(crate) fn restore(&mut self, removed: RemovedMapping) {
		let RemovedMapping { entry, mapping } = removed;
		self.claim(entry.secondary(), &mapping);
		self.graph.restore(*entry.value(), mapping);
		self.index.restore(entry);
	}

	/// Rebuilds every conflict from the current claims and override graph.
	pub fn refresh_conflicts(&mut self) {
		self.graph.clear_conflicts();
		let detected = self.detector.detect_all_conflicts();
		for conflict in &detected {
			let id = match self.graph.create_conflict(&conflict.token) {
				Ok(id) => id,
				Err(error) => {
					tracing::error!(token = %conflict.token, %error, "cannot record conflict");
					continue;
				}
			};
			let members: Vec<MappingId> = self
				.index
				.iter()
				.filter(|(_, owner, _)| conflict.modules.iter().any(|module| module == owner))
				.map(|(_, _, id)| *id)
				.filter(|mapping| self.graph.mapping(*mapping).is_ok_and(|m| m.covers(&conflict.token)))
				.collect();
			for mapping in members {
				if let Err(error) = self.graph.add_conflict(mapping, id) {
					tracing::error!(token = %conflict.token, ?mapping, %error, "cannot attach conflict");
				}
			}
		}

		if !detected.is_empty() {
			let samples: Vec<&str> = detected.iter().take(3).map(|conflict| conflict.token.as_str()).collect();
			tracing::debug!(count = detected.len(), ?samples, "path conflicts detected");
		}
	}

	fn claim(&mut self, module: &str, mapping: &PathMapping) {
		if let Ok(paths) = mapping.list_repository_paths() {
			for path in paths {
				self.detector.claim(path, module);
			}
		}
	}

	fn release(&mut self, module: &str, mapping: &PathMapping) {
		if let Ok(paths) = mapping.list_repository_paths() {
			for path in paths {
				self.detector.release(path, module);
			}
		}
	}
}
