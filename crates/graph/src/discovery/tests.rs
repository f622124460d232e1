use pretty_assertions::assert_eq;

use super::*;
use crate::file::InMemoryModuleFile;
use crate::mapping::OsFilesystem;
use crate::module::Module;
use crate::{Error, ManifoldConfig, Project};

fn descriptor(name: &str) -> BindingTypeDescriptor {
	BindingTypeDescriptor::new(name).unwrap()
}

fn loaded(name: &str, module: &str) -> BindingTypeDescriptor {
	let mut descriptor = descriptor(name);
	descriptor.load(module).unwrap();
	descriptor
}

fn project_with_sink(sink: InMemoryDiscovery) -> Project {
	let mut project = Project::new(ManifoldConfig::default(), sink, OsFilesystem).unwrap();
	project.add_root_module(Module::new("root", "/project"), InMemoryModuleFile::new()).unwrap();
	project
		.add_module(
			Module::new("vendor", "/project/vendor"),
			InMemoryModuleFile::new()
				.with_type_descriptor(descriptor("acme/resource").with_description("vendor resource"))
				.with_type_descriptor(descriptor("acme/asset")),
		)
		.unwrap();
	project
}

fn project() -> Project {
	project_with_sink(InMemoryDiscovery::new())
}

fn defined(project: &Project) -> Vec<&str> {
	project.sink().binding_types().into_iter().map(|ty| ty.name.as_str()).collect()
}

#[test]
fn blank_type_name_rejected() {
	assert_eq!(
		BindingTypeDescriptor::new("  ").unwrap_err(),
		DiscoveryError::InvalidTypeName { type_name: "  ".into() }
	);
}

#[test]
fn descriptor_lifecycle() {
	let mut descriptor = descriptor("acme/resource")
		.with_parameter(BindingParameter::required("path"))
		.with_parameter(BindingParameter::optional("lang", Some("en".into())));
	assert!(!descriptor.is_enabled());
	assert_eq!(descriptor.unload().unwrap_err(), DiscoveryError::NotLoaded { type_name: "acme/resource".into() });

	descriptor.load("vendor").unwrap();
	assert_eq!(descriptor.module_name(), Some("vendor"));
	assert!(descriptor.is_enabled());
	assert!(matches!(descriptor.load("root"), Err(DiscoveryError::AlreadyLoaded { .. })));

	descriptor.set_duplicate(true);
	assert!(!descriptor.is_enabled());
	descriptor.unload().unwrap();
	assert!(!descriptor.is_duplicate());
	assert_eq!(descriptor.parameter("lang").and_then(BindingParameter::default_value), Some("en"));
	assert!(descriptor.parameter("path").is_some_and(BindingParameter::is_required));
}

#[test]
fn declaration_drops_load_state() {
	let descriptor = loaded("acme/resource", "vendor");
	let declaration = descriptor.declaration();
	assert!(!declaration.is_loaded());
	assert_eq!(declaration.to_binding_type(), descriptor.to_binding_type());
}

#[test]
fn registry_returns_first_registered_descriptor() {
	let mut registry = BindingTypeRegistry::new();
	registry.set(loaded("acme/resource", "vendor")).unwrap();
	registry.set(loaded("acme/resource", "root")).unwrap();
	registry.set(loaded("acme/asset", "root")).unwrap();

	assert_eq!(registry.get("acme/resource").unwrap().module_name(), Some("vendor"));
	let modules: Vec<_> = registry.get_all("acme/resource").into_iter().filter_map(|d| d.module_name()).collect();
	assert_eq!(modules, ["vendor", "root"]);
	assert_eq!(registry.module_descriptors("root").len(), 2);
	assert_eq!(registry.type_names(), ["acme/resource", "acme/asset"]);
	assert!(registry.get_all("acme/missing").is_empty());
	assert!(registry.set(descriptor("acme/unloaded")).is_err());
}

#[test]
fn duplicate_marks_follow_definition_count() {
	let mut registry = BindingTypeRegistry::new();
	registry.set(loaded("acme/resource", "vendor")).unwrap();
	registry.set(loaded("acme/resource", "root")).unwrap();
	registry.update_duplicate_marks("acme/resource");
	assert!(registry.get_all("acme/resource").iter().all(|d| d.is_duplicate()));
	assert!(registry.enabled("acme/resource").is_none());

	registry.take("acme/resource", "root");
	registry.update_duplicate_marks("acme/resource");
	assert!(!registry.get("acme/resource").unwrap().is_duplicate());
	assert_eq!(registry.enabled("acme/resource").and_then(|d| d.module_name()), Some("vendor"));
}

#[test]
fn in_memory_sink_rejects_redefinition() {
	let mut sink = InMemoryDiscovery::new();
	sink.define_type(&loaded("acme/resource", "root")).unwrap();
	assert!(sink.has_binding_type("acme/resource"));
	assert!(matches!(
		sink.define_type(&loaded("acme/resource", "vendor")),
		Err(DiscoveryError::TypeAlreadyDefined { .. })
	));
	sink.undefine_type("acme/resource").unwrap();
	assert!(matches!(sink.undefine_type("acme/resource"), Err(DiscoveryError::TypeNotDefined { .. })));
}

#[test]
fn in_memory_sink_restores_definition_order() {
	let mut sink = InMemoryDiscovery::new();
	for name in ["acme/a", "acme/b", "acme/c"] {
		sink.define_type(&loaded(name, "root")).unwrap();
	}
	let before = sink.clone();

	let (position, removed) = sink.undefine_type("acme/b").unwrap();
	assert_eq!(position, 1);
	sink.define_type(&loaded("acme/d", "root")).unwrap();
	sink.undefine_type("acme/d").unwrap();
	sink.restore_binding_type(position, removed.clone()).unwrap();

	let names: Vec<_> = sink.binding_types().into_iter().map(|ty| ty.name.as_str()).collect();
	assert_eq!(names, ["acme/a", "acme/b", "acme/c"]);
	assert_eq!(sink, before);
	assert!(matches!(sink.restore_binding_type(0, removed), Err(DiscoveryError::TypeAlreadyDefined { .. })));
}

#[test]
fn in_memory_sink_equality_follows_order() {
	let mut forward = InMemoryDiscovery::new();
	let mut backward = InMemoryDiscovery::new();
	for name in ["acme/a", "acme/b"] {
		forward.define_type(&loaded(name, "root")).unwrap();
	}
	for name in ["acme/b", "acme/a"] {
		backward.define_type(&loaded(name, "root")).unwrap();
	}
	assert_ne!(forward, backward);
}

#[test]
fn loading_module_publishes_its_types() {
	let mut project = project();
	project.load_module_types("vendor").unwrap();

	assert_eq!(defined(&project), ["acme/resource", "acme/asset"]);
	assert_eq!(project.type_descriptor("acme/resource").unwrap().module_name(), Some("vendor"));
	assert_eq!(
		project.sink().binding_type("acme/resource").and_then(|ty| ty.description.as_deref()),
		Some("vendor resource")
	);

	project.unload_module_types("vendor").unwrap();
	assert!(defined(&project).is_empty());
	assert!(!project.has_type_descriptor("acme/resource"));
}

#[test]
fn root_type_descriptor_is_persisted_loaded_and_published() {
	let mut project = project();
	project.add_root_type_descriptor(descriptor("acme/page")).unwrap();

	assert!(project.module_file("root").unwrap().has_type_descriptor("acme/page"));
	assert!(!project.module_file("root").unwrap().type_descriptor("acme/page").unwrap().is_loaded());
	assert_eq!(project.module_type_descriptor("acme/page", "root").unwrap().module_name(), Some("root"));
	assert_eq!(defined(&project), ["acme/page"]);

	let err = project.add_root_type_descriptor(descriptor("acme/page")).unwrap_err();
	assert!(matches!(err, Error::Discovery(DiscoveryError::DuplicateType { .. })));

	project.remove_root_type_descriptor("acme/page").unwrap();
	assert!(!project.module_file("root").unwrap().has_type_descriptor("acme/page"));
	assert!(!project.has_type_descriptor("acme/page"));
	assert!(defined(&project).is_empty());

	project.remove_root_type_descriptor("acme/page").unwrap();
}

#[test]
fn types_defined_twice_are_withdrawn_until_unique() {
	let mut project = project();
	project.load_module_types("vendor").unwrap();
	project.add_root_type_descriptor(descriptor("acme/resource")).unwrap();

	assert!(project.type_descriptors("acme/resource").iter().all(|d| d.is_duplicate()));
	assert_eq!(defined(&project), ["acme/asset"]);

	project.remove_root_type_descriptor("acme/resource").unwrap();
	assert!(!project.type_descriptor("acme/resource").unwrap().is_duplicate());
	assert_eq!(defined(&project), ["acme/asset", "acme/resource"]);
}

#[test]
fn sink_failure_rolls_back_file_and_registry() {
	let mut sink = InMemoryDiscovery::new();
	sink.define_type(&loaded("acme/page", "elsewhere")).unwrap();
	let mut project = project_with_sink(sink);

	let err = project.add_root_type_descriptor(descriptor("acme/page")).unwrap_err();
	assert!(matches!(err, Error::Discovery(DiscoveryError::TypeAlreadyDefined { .. })));
	assert!(!project.module_file("root").unwrap().has_type_descriptor("acme/page"));
	assert!(!project.has_type_descriptor("acme/page"));
	assert_eq!(defined(&project), ["acme/page"]);
}

#[test]
fn missing_module_file_is_reported() {
	let mut project = project();
	assert!(matches!(
		project.load_module_types("ghost"),
		Err(Error::File(crate::file::FileError::NoModuleFile { .. }))
	));
}
