use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Filesystem queries needed to resolve path mappings.
pub trait FilesystemProbe {
	fn exists(&self, path: &Path) -> bool;

	/// Every descendant of `path`, excluding `path` itself.
	///
	/// Returns an empty list for files and missing paths. Implementations
	/// should return entries in a stable order.
	fn list_children_recursive(&self, path: &Path) -> Vec<PathBuf>;
}

/// [`FilesystemProbe`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl FilesystemProbe for OsFilesystem {
	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	fn list_children_recursive(&self, path: &Path) -> Vec<PathBuf> {
		WalkDir::new(path)
			.min_depth(1)
			.sort_by_file_name()
			.into_iter()
			.filter_map(|entry| match entry {
				Ok(entry) => Some(entry.into_path()),
				Err(error) => {
					tracing::warn!(root = %path.display(), %error, "skipping unreadable entry");
					None
				}
			})
			.collect()
	}
}
