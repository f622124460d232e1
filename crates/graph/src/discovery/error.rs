use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
	#[error("invalid binding type name {type_name:?}")]
	InvalidTypeName { type_name: String },
	#[error("binding type {type_name} is already loaded")]
	AlreadyLoaded { type_name: String },
	#[error("binding type {type_name} is not loaded")]
	NotLoaded { type_name: String },
	#[error("binding type {type_name} is already defined in the discovery sink")]
	TypeAlreadyDefined { type_name: String },
	#[error("binding type {type_name} is not defined in the discovery sink")]
	TypeNotDefined { type_name: String },
	#[error("module {module} already declares binding type {type_name}")]
	DuplicateType { type_name: String, module: String },
}
