//! Project configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid configuration: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("module {module} appears more than once in override-order")]
	RepeatedModule { module: String },
}

/// Settings supplied by the caller when opening a [`crate::Project`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManifoldConfig {
	/// Module names from lowest to highest precedence.
	///
	/// Consecutive entries become override edges, so two modules listed here
	/// never conflict with each other. Names of unknown modules are ignored.
	pub override_order: Vec<String>,
}

impl ManifoldConfig {
	/// Parses a TOML document.
	///
	/// ```toml
	/// override-order = ["acme/theme", "acme/site"]
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	pub fn with_override_order<I, S>(mut self, order: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.override_order = order.into_iter().map(Into::into).collect();
		self
	}

	/// Rejects an override order naming a module twice.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut seen = rustc_hash::FxHashSet::default();
		for module in &self.override_order {
			if !seen.insert(module.as_str()) {
				return Err(ConfigError::RepeatedModule { module: module.clone() });
			}
		}
		Ok(())
	}
}
