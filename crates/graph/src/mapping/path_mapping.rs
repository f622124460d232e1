use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

use super::reference::{join_repository_path, normalize_repository_path};
use super::{ConflictId, FilesystemProbe, LoadError, MappingError, PathReference};
use crate::module::{Module, ModuleProvider};

/// Load state of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingState {
	/// At least one path reference resolved and no conflict is attached.
	Enabled,
	/// No path reference resolved.
	NotFound,
	/// At least one path reference resolved and a conflict is attached.
	Conflict,
}

/// Maps a repository path onto one or more filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
	repository_path: String,
	references: Vec<PathReference>,
	resolution: Option<Resolution>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
	module: String,
	filesystem_paths: Vec<PathBuf>,
	/// Repository path to the filesystem path that provides it.
	table: IndexMap<String, PathBuf>,
	load_errors: Vec<LoadError>,
	/// Attached conflicts keyed by their repository path.
	conflicts: IndexMap<String, ConflictId>,
}

impl PathMapping {
	/// Creates an unloaded mapping.
	///
	/// # Errors
	///
	/// Fails if the repository path is not `/`-rooted or no reference is given.
	pub fn new<I, S>(repository_path: &str, references: I) -> Result<Self, MappingError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let repository_path = normalize_repository_path(repository_path)?;
		let references: Vec<PathReference> = references.into_iter().map(|r| PathReference::parse(r.as_ref())).collect();
		if references.is_empty() {
			return Err(MappingError::NoPathReferences { repository_path });
		}
		Ok(Self {
			repository_path,
			references,
			resolution: None,
		})
	}

	pub fn repository_path(&self) -> &str {
		&self.repository_path
	}

	/// Declared path references in order.
	pub fn path_references(&self) -> &[PathReference] {
		&self.references
	}

	pub fn is_loaded(&self) -> bool {
		self.resolution.is_some()
	}

	/// Same repository path and references, unloaded.
	pub fn declaration(&self) -> Self {
		Self {
			repository_path: self.repository_path.clone(),
			references: self.references.clone(),
			resolution: None,
		}
	}

	/// Resolves every path reference against `owner` and `modules`.
	///
	/// Unresolvable references are skipped and reported as [`LoadError`]s,
	/// which are returned and also kept for [`Self::load_errors`].
	///
	/// # Errors
	///
	/// Returns [`MappingError::AlreadyLoaded`] if the mapping is loaded.
	pub fn load(&mut self, owner: &Module, modules: &dyn ModuleProvider, fs: &dyn FilesystemProbe) -> Result<Vec<LoadError>, MappingError> {
		if self.resolution.is_some() {
			return Err(MappingError::AlreadyLoaded {
				repository_path: self.repository_path.clone(),
			});
		}

		let mut filesystem_paths = Vec::new();
		let mut load_errors = Vec::new();
		for reference in &self.references {
			let base = match reference.module() {
				None => owner.root_dir(),
				Some(name) => match modules.module_by_name(name) {
					Ok(module) => module.root_dir(),
					Err(_) => {
						load_errors.push(LoadError::NoSuchModule {
							reference: reference.to_string(),
							module: name.to_string(),
						});
						continue;
					}
				},
			};

			let relative = reference.relative_path();
			let candidate = if relative.is_empty() { base.to_path_buf() } else { base.join(relative) };
			if !fs.exists(&candidate) {
				load_errors.push(LoadError::FileNotFound {
					reference: reference.to_string(),
					path: candidate,
				});
				continue;
			}
			filesystem_paths.push(candidate);
		}

		let mut table = IndexMap::new();
		for filesystem_path in &filesystem_paths {
			table.insert(self.repository_path.clone(), filesystem_path.clone());
			for child in fs.list_children_recursive(filesystem_path) {
				let Some(relative) = relative_repository_suffix(filesystem_path, &child) else {
					continue;
				};
				let repository_path = join_repository_path(&self.repository_path, &relative);
				tracing::trace!(repository_path = %repository_path, filesystem_path = %child.display(), "mapped");
				table.insert(repository_path, child);
			}
		}

		tracing::debug!(
			repository_path = %self.repository_path,
			module = owner.name(),
			resolved = filesystem_paths.len(),
			errors = load_errors.len(),
			"path mapping loaded"
		);

		self.resolution = Some(Resolution {
			module: owner.name().to_string(),
			filesystem_paths,
			table,
			load_errors: load_errors.clone(),
			conflicts: IndexMap::new(),
		});
		Ok(load_errors)
	}

	/// Returns the mapping to the unloaded state.
	///
	/// Mappings owned by a [`super::MappingGraph`] are unloaded through
	/// [`super::MappingGraph::unload`], which detaches conflicts first.
	///
	/// # Errors
	///
	/// Returns [`MappingError::NotLoaded`] if the mapping is not loaded.
	pub fn unload(&mut self) -> Result<(), MappingError> {
		self.loaded()?;
		self.resolution = None;
		Ok(())
	}

	/// Name of the module the mapping was loaded for.
	pub fn module_name(&self) -> Result<&str, MappingError> {
		Ok(&self.loaded()?.module)
	}

	/// Resolved filesystem paths in declared reference order.
	pub fn filesystem_paths(&self) -> Result<&[PathBuf], MappingError> {
		Ok(&self.loaded()?.filesystem_paths)
	}

	/// `(filesystem path, repository path)` pairs sorted by repository path.
	pub fn list_path_mappings(&self) -> Result<Vec<(&Path, &str)>, MappingError> {
		let mut pairs: Vec<(&Path, &str)> = self
			.loaded()?
			.table
			.iter()
			.map(|(repository_path, filesystem_path)| (filesystem_path.as_path(), repository_path.as_str()))
			.collect();
		pairs.sort_by(|a, b| a.1.cmp(b.1));
		Ok(pairs)
	}

	/// Every repository path produced by the mapping, sorted.
	pub fn list_repository_paths(&self) -> Result<Vec<&str>, MappingError> {
		let mut paths: Vec<&str> = self.loaded()?.table.keys().map(String::as_str).collect();
		paths.sort_unstable();
		Ok(paths)
	}

	/// Filesystem path that provides `repository_path`, if mapped.
	pub fn filesystem_path_for(&self, repository_path: &str) -> Option<&Path> {
		self.resolution.as_ref()?.table.get(repository_path).map(PathBuf::as_path)
	}

	pub fn load_errors(&self) -> Result<&[LoadError], MappingError> {
		Ok(&self.loaded()?.load_errors)
	}

	/// True if loaded and at least one reference resolved.
	pub fn is_enabled(&self) -> bool {
		self.resolution.as_ref().is_some_and(|r| !r.filesystem_paths.is_empty())
	}

	/// True if loaded and no reference resolved.
	pub fn is_not_found(&self) -> bool {
		self.resolution.as_ref().is_some_and(|r| r.filesystem_paths.is_empty())
	}

	pub fn state(&self) -> Result<MappingState, MappingError> {
		let resolution = self.loaded()?;
		Ok(if resolution.filesystem_paths.is_empty() {
			MappingState::NotFound
		} else if resolution.conflicts.is_empty() {
			MappingState::Enabled
		} else {
			MappingState::Conflict
		})
	}

	/// True if `repository_path` is the mapping's own path or one it produces.
	pub fn covers(&self, repository_path: &str) -> bool {
		repository_path == self.repository_path || self.resolution.as_ref().is_some_and(|r| r.table.contains_key(repository_path))
	}

	/// Attached conflicts in attach order.
	pub fn conflict_ids(&self) -> Vec<ConflictId> {
		self.resolution
			.as_ref()
			.map(|r| r.conflicts.values().copied().collect())
			.unwrap_or_default()
	}

	pub fn has_conflicts(&self) -> bool {
		self.resolution.as_ref().is_some_and(|r| !r.conflicts.is_empty())
	}

	pub(crate) fn conflict_at(&self, repository_path: &str) -> Option<ConflictId> {
		self.resolution.as_ref()?.conflicts.get(repository_path).copied()
	}

	pub(crate) fn set_conflict(&mut self, repository_path: String, conflict: ConflictId) {
		if let Some(resolution) = &mut self.resolution {
			resolution.conflicts.insert(repository_path, conflict);
		}
	}

	pub(crate) fn clear_conflict(&mut self, repository_path: &str) {
		if let Some(resolution) = &mut self.resolution {
			resolution.conflicts.shift_remove(repository_path);
		}
	}

	/// Forgets attached conflicts without touching the conflict side.
	pub(crate) fn forget_conflicts(&mut self) {
		if let Some(resolution) = &mut self.resolution {
			resolution.conflicts.clear();
		}
	}

	pub(crate) fn require_loaded(&self) -> Result<(), MappingError> {
		self.loaded().map(|_| ())
	}

	fn loaded(&self) -> Result<&Resolution, MappingError> {
		self.resolution.as_ref().ok_or_else(|| MappingError::NotLoaded {
			repository_path: self.repository_path.clone(),
		})
	}
}

/// `/`-separated path of `child` relative to `root`.
fn relative_repository_suffix(root: &Path, child: &Path) -> Option<String> {
	let relative = child.strip_prefix(root).ok()?;
	let segments: Vec<String> = relative
		.components()
		.filter_map(|component| match component {
			Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
			_ => None,
		})
		.collect();
	Some(segments.join("/"))
}
