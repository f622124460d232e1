use std::fmt;

use super::MappingError;

/// Source of a path mapping, relative to a module root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathReference {
	/// Resolved against the owning module's root directory.
	Local(String),
	/// `@module:path`, resolved against the named module's root directory.
	Module { module: String, path: String },
}

impl PathReference {
	/// Parses a declared reference.
	///
	/// Only references starting with `@` and containing a `:` are cross-module
	/// references; everything else is taken verbatim as module-relative.
	pub fn parse(reference: &str) -> Self {
		if let Some(rest) = reference.strip_prefix('@')
			&& let Some((module, path)) = rest.split_once(':')
		{
			return Self::Module {
				module: module.to_string(),
				path: path.to_string(),
			};
		}
		Self::Local(reference.to_string())
	}

	/// Module named by a cross-module reference.
	pub fn module(&self) -> Option<&str> {
		match self {
			Self::Local(_) => None,
			Self::Module { module, .. } => Some(module),
		}
	}

	/// Path relative to the base module's root.
	pub fn relative_path(&self) -> &str {
		match self {
			Self::Local(path) | Self::Module { path, .. } => path,
		}
	}
}

impl fmt::Display for PathReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local(path) => f.write_str(path),
			Self::Module { module, path } => write!(f, "@{module}:{path}"),
		}
	}
}

impl From<&str> for PathReference {
	fn from(reference: &str) -> Self {
		Self::parse(reference)
	}
}

/// Canonicalizes a repository path.
///
/// The path must start with `/`. Empty and `.` segments are dropped, `..`
/// pops a segment (never above the root) and trailing slashes are removed.
pub fn normalize_repository_path(path: &str) -> Result<String, MappingError> {
	if !path.starts_with('/') {
		return Err(MappingError::InvalidRepositoryPath { path: path.to_string() });
	}
	let mut segments: Vec<&str> = Vec::new();
	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other),
		}
	}
	Ok(format!("/{}", segments.join("/")))
}

/// Joins a relative sub-path (already `/`-separated) onto a repository path.
pub(crate) fn join_repository_path(base: &str, relative: &str) -> String {
	if relative.is_empty() {
		base.to_string()
	} else if base == "/" {
		format!("/{relative}")
	} else {
		format!("{base}/{relative}")
	}
}
