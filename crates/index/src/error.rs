use thiserror::Error;

/// Lookup failures raised by [`crate::CompositeIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
	/// No bucket exists for the primary key.
	#[error("no entries for primary key {primary:?}")]
	PrimaryNotFound { primary: String },
	/// No value is stored for the (primary, secondary) pair.
	#[error("no entry for key ({primary:?}, {secondary:?})")]
	EntryNotFound { primary: String, secondary: String },
}

impl IndexError {
	pub(crate) fn primary_not_found(primary: &str) -> Self {
		Self::PrimaryNotFound { primary: primary.to_string() }
	}

	pub(crate) fn entry_not_found(primary: &str, secondary: &str) -> Self {
		Self::EntryNotFound {
			primary: primary.to_string(),
			secondary: secondary.to_string(),
		}
	}
}
