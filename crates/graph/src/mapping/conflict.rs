use indexmap::IndexSet;

/// Handle of a [`super::PathMapping`] inside a [`super::MappingGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingId(pub(crate) u64);

/// Handle of a [`PathConflict`] inside a [`super::MappingGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictId(pub(crate) u64);

/// Set of loaded mappings that all produce the same repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
	repository_path: String,
	mappings: IndexSet<MappingId>,
}

impl PathConflict {
	pub(crate) fn new(repository_path: String) -> Self {
		Self {
			repository_path,
			mappings: IndexSet::new(),
		}
	}

	pub fn repository_path(&self) -> &str {
		&self.repository_path
	}

	/// Member mappings in attach order.
	pub fn mappings(&self) -> impl Iterator<Item = MappingId> + '_ {
		self.mappings.iter().copied()
	}

	pub fn contains(&self, mapping: MappingId) -> bool {
		self.mappings.contains(&mapping)
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}

	/// A conflict with fewer than two members no longer competes for its path.
	pub fn is_resolved(&self) -> bool {
		self.mappings.len() < 2
	}

	pub(crate) fn attach(&mut self, mapping: MappingId) {
		self.mappings.insert(mapping);
	}

	pub(crate) fn detach(&mut self, mapping: MappingId) {
		self.mappings.shift_remove(&mapping);
	}
}
