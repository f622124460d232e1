use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
	#[error("module not found: {name}")]
	NotFound { name: String },
	#[error("module already exists: {name}")]
	Duplicate { name: String },
	#[error("cannot make {name} the root module: {existing} is already root")]
	RootAlreadySet { existing: String, name: String },
	/// Adding `overridden -> overriding` would close a cycle in the override graph.
	#[error("override of {overridden} by {overriding} creates a cycle")]
	CyclicOverride { overridden: String, overriding: String },
}
