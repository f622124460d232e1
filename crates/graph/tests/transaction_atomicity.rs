use std::fs;
use std::path::Path;

use manifold_graph::discovery::operations::{
	AddTypeDescriptorToFile, LoadTypeDescriptor, RemoveTypeDescriptorFromFile, SyncTypeName, UnloadTypeDescriptor, UpdateDuplicateMarks,
};
use manifold_graph::discovery::{BindingTypeDescriptor, DiscoveryError, InMemoryDiscovery};
use manifold_graph::file::InMemoryModuleFile;
use manifold_graph::mapping::{OsFilesystem, PathMapping};
use manifold_graph::module::Module;
use manifold_graph::repository::ConflictSnapshot;
use manifold_graph::repository::operations::{
	AddPathMappingToFile, LoadPathMapping, RefreshConflicts, RemovePathMappingFromFile, UnloadPathMapping,
};
use manifold_graph::{Error, ManifoldConfig, Project};
use manifold_transaction::{AtomicOperation, Transaction};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Everything a transaction may touch, in a form comparable across runs.
#[derive(Debug, PartialEq, Eq)]
struct State {
	types: Vec<(String, String, bool)>,
	defined: Vec<String>,
	files: Vec<(String, Vec<String>, Vec<String>)>,
	mappings: Vec<(String, String, Vec<String>)>,
	conflicts: Vec<ConflictSnapshot>,
}

impl State {
	fn capture(project: &Project) -> Self {
		let types = project
			.binding_types()
			.descriptors()
			.map(|d| (d.type_name().to_string(), d.module_name().unwrap_or_default().to_string(), d.is_duplicate()))
			.collect();
		let defined = project.sink().binding_types().into_iter().map(|ty| ty.name.clone()).collect();
		let files = project
			.files()
			.modules()
			.map(|module| {
				let file = project.module_file(module).unwrap();
				(
					module.to_string(),
					file.type_descriptors().into_iter().map(|d| d.type_name().to_string()).collect(),
					file.path_mappings().into_iter().map(|m| m.repository_path().to_string()).collect(),
				)
			})
			.collect();
		let mappings = project
			.modules()
			.names()
			.flat_map(|module| project.module_path_mappings(module))
			.map(|mapping| {
				(
					mapping.repository_path().to_string(),
					mapping.module_name().unwrap().to_string(),
					mapping.list_repository_paths().unwrap().into_iter().map(str::to_string).collect(),
				)
			})
			.collect();
		Self {
			types,
			defined,
			files,
			mappings,
			conflicts: project.conflict_snapshot(),
		}
	}
}

struct InjectedFailure;

impl AtomicOperation<Project> for InjectedFailure {
	type Error = Error;

	fn execute(&mut self, _: &mut Project) -> Result<(), Error> {
		Err(DiscoveryError::TypeNotDefined {
			type_name: "injected".into(),
		}
		.into())
	}

	fn rollback(&mut self, _: &mut Project) {
		unreachable!("failed operations are never rolled back");
	}
}

fn descriptor(name: &str) -> BindingTypeDescriptor {
	BindingTypeDescriptor::new(name).unwrap()
}

fn write(root: &Path, files: &[&str]) {
	for file in files {
		let path = root.join(file);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, file).unwrap();
	}
}

fn project(dir: &TempDir) -> Project {
	let _ = tracing_subscriber::fmt::try_init();
	let base = dir.path();
	write(&base.join("root"), &["public/index.html", "public/app.js"]);
	write(&base.join("vendor"), &["public/index.html"]);
	write(&base.join("theme"), &["public/index.html", "public/theme.css"]);

	let web = || PathMapping::new("/web", ["public"]).unwrap();
	let mut project = Project::new(ManifoldConfig::default(), InMemoryDiscovery::new(), OsFilesystem).unwrap();
	project.add_root_module(Module::new("root", base.join("root")), InMemoryModuleFile::new()).unwrap();
	project
		.add_module(
			Module::new("vendor", base.join("vendor")),
			InMemoryModuleFile::new().with_type_descriptor(descriptor("acme/resource")).with_path_mapping(web()),
		)
		.unwrap();
	project
		.add_module(
			Module::new("theme", base.join("theme")),
			InMemoryModuleFile::new().with_type_descriptor(descriptor("acme/style")).with_path_mapping(web()),
		)
		.unwrap();
	project.load_module("vendor").unwrap();
	project.load_module("theme").unwrap();
	project
}

const STEPS: usize = 8;

/// Builds a transaction mixing file, registry, mapping and sink operations,
/// with an injected failure before step `fail_at`.
fn transaction(project: &Project, fail_at: Option<usize>) -> Transaction<Project, Error> {
	let web = || PathMapping::new("/web", ["public"]).unwrap();
	let mut syncs = vec![SyncTypeName::snapshot(project, "acme/page"), SyncTypeName::snapshot(project, "acme/resource")].into_iter();

	let mut transaction = Transaction::new();
	for step in 0..=STEPS {
		if fail_at == Some(step) {
			transaction.push(InjectedFailure);
		}
		match step {
			0 => {
				transaction.push(AddTypeDescriptorToFile::new("root", descriptor("acme/page")));
			}
			1 => {
				transaction.push_intercepted(LoadTypeDescriptor::new("root", descriptor("acme/page")), UpdateDuplicateMarks::new("acme/page"));
			}
			2 => {
				transaction.push_intercepted(
					LoadTypeDescriptor::new("root", descriptor("acme/resource")),
					UpdateDuplicateMarks::new("acme/resource"),
				);
			}
			3 => {
				transaction.push(AddPathMappingToFile::new("root", web()));
			}
			4 => {
				transaction.push_intercepted(LoadPathMapping::new("root", web()), RefreshConflicts);
			}
			5 => {
				transaction.push_intercepted(UnloadPathMapping::new("theme", "/web"), RefreshConflicts);
			}
			6 | 7 => {
				transaction.push(syncs.next().unwrap());
			}
			_ => {}
		}
	}
	transaction
}

#[test]
fn failure_at_any_step_restores_previous_state() {
	for fail_at in 0..=STEPS {
		let dir = tempfile::tempdir().unwrap();
		let mut project = project(&dir);
		let before = State::capture(&project);

		let tx = transaction(&project, Some(fail_at));
		assert_eq!(tx.len(), STEPS + 1);
		let err = tx.commit(&mut project).err().expect("transaction must fail");
		assert!(matches!(err, Error::Discovery(DiscoveryError::TypeNotDefined { .. })), "step {fail_at}: {err}");

		assert_eq!(State::capture(&project), before, "state after failure at step {fail_at}");
	}
}

#[test]
fn successful_commit_applies_every_step() {
	let dir = tempfile::tempdir().unwrap();
	let mut project = project(&dir);
	let before = State::capture(&project);

	let committed = transaction(&project, None).commit(&mut project).unwrap();
	assert_eq!(committed.len(), STEPS);

	let after = State::capture(&project);
	assert_eq!(after.defined, ["acme/style", "acme/page"]);
	assert!(after.types.contains(&("acme/resource".into(), "root".into(), true)));
	assert_eq!(
		after.conflicts,
		[
			ConflictSnapshot {
				repository_path: "/web".into(),
				modules: vec!["root".into(), "vendor".into()],
			},
			ConflictSnapshot {
				repository_path: "/web/index.html".into(),
				modules: vec!["root".into(), "vendor".into()],
			},
		]
	);

	committed.rollback(&mut project);
	assert_eq!(State::capture(&project), before);
}

#[test]
fn duplicate_marks_converge_after_rollback() {
	let dir = tempfile::tempdir().unwrap();
	let mut project = project(&dir);
	assert!(!project.type_descriptor("acme/resource").unwrap().is_duplicate());

	let mut tx: Transaction<Project, Error> = Transaction::new();
	tx.push_intercepted(LoadTypeDescriptor::new("root", descriptor("acme/resource")), UpdateDuplicateMarks::new("acme/resource"))
		.push(InjectedFailure);
	tx.commit(&mut project).err().expect("transaction must fail");
	assert_eq!(project.type_descriptors("acme/resource").len(), 1);
	assert!(!project.type_descriptor("acme/resource").unwrap().is_duplicate());

	project.add_root_type_descriptor(descriptor("acme/resource")).unwrap();
	assert!(project.type_descriptors("acme/resource").iter().all(|d| d.is_duplicate()));

	let mut tx: Transaction<Project, Error> = Transaction::new();
	tx.push_intercepted(UnloadTypeDescriptor::new("vendor", "acme/resource"), UpdateDuplicateMarks::new("acme/resource"))
		.push(InjectedFailure);
	tx.commit(&mut project).err().expect("transaction must fail");
	assert!(project.type_descriptors("acme/resource").iter().all(|d| d.is_duplicate()));

	project.unload_module_types("vendor").unwrap();
	let remaining = project.type_descriptors("acme/resource");
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].module_name(), Some("root"));
	assert!(!remaining[0].is_duplicate());
	assert_eq!(project.sink().binding_type("acme/resource").map(|ty| ty.name.as_str()), Some("acme/resource"));
}

#[test]
fn module_load_rolls_back_types_when_mappings_fail() {
	let dir = tempfile::tempdir().unwrap();
	let mut project = project(&dir);
	project.unload_module("theme").unwrap();
	project.load_module_mappings("theme").unwrap();
	let before = State::capture(&project);

	let err = project.load_module("theme").unwrap_err();
	assert!(matches!(err, Error::DuplicatePathMapping { .. }));
	assert_eq!(State::capture(&project), before);
	assert!(!project.has_type_descriptor("acme/style"));
}

fn declared_types(project: &Project, module: &str) -> Vec<String> {
	project.module_file(module).unwrap().type_descriptors().into_iter().map(|d| d.type_name().to_string()).collect()
}

fn declared_mappings(project: &Project, module: &str) -> Vec<String> {
	project.module_file(module).unwrap().path_mappings().into_iter().map(|m| m.repository_path().to_string()).collect()
}

#[test]
fn removals_are_undone_in_place() {
	let _ = tracing_subscriber::fmt::try_init();
	let dir = tempfile::tempdir().unwrap();
	write(&dir.path().join("site"), &["public/index.html", "assets/app.css"]);
	let mut project = Project::new(ManifoldConfig::default(), InMemoryDiscovery::new(), OsFilesystem).unwrap();
	project
		.add_root_module(
			Module::new("site", dir.path().join("site")),
			InMemoryModuleFile::new()
				.with_type_descriptor(descriptor("acme/first"))
				.with_type_descriptor(descriptor("acme/second"))
				.with_path_mapping(PathMapping::new("/first", ["public"]).unwrap())
				.with_path_mapping(PathMapping::new("/second", ["assets"]).unwrap()),
		)
		.unwrap();
	project.load_module("site").unwrap();
	let before = State::capture(&project);
	assert_eq!(before.defined, ["acme/first", "acme/second"]);

	let sync = SyncTypeName::snapshot(&project, "acme/first");
	let mut tx: Transaction<Project, Error> = Transaction::new();
	tx.push_intercepted(UnloadTypeDescriptor::new("site", "acme/first"), UpdateDuplicateMarks::new("acme/first"))
		.push(sync)
		.push(RemoveTypeDescriptorFromFile::new("site", "acme/first"))
		.push_intercepted(UnloadPathMapping::new("site", "/first"), RefreshConflicts)
		.push(RemovePathMappingFromFile::new("site", "/first"))
		.push(InjectedFailure);
	tx.commit(&mut project).err().expect("transaction must fail");

	assert_eq!(State::capture(&project), before);
	let defined: Vec<_> = project.sink().binding_types().into_iter().map(|ty| ty.name.as_str()).collect();
	assert_eq!(defined, ["acme/first", "acme/second"]);
	assert_eq!(declared_types(&project, "site"), ["acme/first", "acme/second"]);
	assert_eq!(declared_mappings(&project, "site"), ["/first", "/second"]);
}

#[test]
fn root_removals_keep_remaining_order() {
	let dir = tempfile::tempdir().unwrap();
	let mut project = project(&dir);
	for name in ["acme/a", "acme/b", "acme/c"] {
		project.add_root_type_descriptor(descriptor(name)).unwrap();
	}
	project.remove_root_type_descriptor("acme/b").unwrap();

	assert_eq!(declared_types(&project, "root"), ["acme/a", "acme/c"]);
	let defined: Vec<_> = project.sink().binding_types().into_iter().map(|ty| ty.name.as_str()).collect();
	assert_eq!(defined, ["acme/resource", "acme/style", "acme/a", "acme/c"]);
}
