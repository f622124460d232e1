use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

use super::{ModuleError, ModuleGraph};

/// Directed graph of override relationships between modules.
///
/// An edge `a -> b` means `b` overrides `a`. A path from `a` to `b` means `b`
/// wins over `a`, directly or transitively. The graph is kept acyclic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideGraph {
	edges: IndexMap<String, IndexSet<String>>,
}

impl OverrideGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the graph for every module in `modules`.
	///
	/// Declared overrides of modules that are not part of the graph are
	/// ignored. `order` chains consecutive known modules so that later
	/// entries override earlier ones.
	///
	/// # Errors
	///
	/// Returns [`ModuleError::CyclicOverride`] if declarations and `order`
	/// contradict each other.
	pub fn for_modules(modules: &ModuleGraph, order: &[String]) -> Result<Self, ModuleError> {
		let mut graph = Self::new();
		for module in modules.iter() {
			graph.add_module(module.name());
		}
		for module in modules.iter() {
			for overridden in module.overrides() {
				if !modules.contains(overridden) {
					tracing::trace!(module = module.name(), overridden = %overridden, "ignoring override of unknown module");
					continue;
				}
				graph.add_edge(overridden, module.name())?;
			}
		}

		let known: Vec<&String> = order.iter().filter(|name| modules.contains(name)).collect();
		for pair in known.windows(2) {
			graph.add_edge(pair[0], pair[1])?;
		}
		Ok(graph)
	}

	pub fn add_module(&mut self, name: &str) {
		if !self.edges.contains_key(name) {
			self.edges.insert(name.to_string(), IndexSet::new());
		}
	}

	pub fn has_module(&self, name: &str) -> bool {
		self.edges.contains_key(name)
	}

	/// Records that `overriding` overrides `overridden`.
	///
	/// Unknown modules are added. Adding an existing edge is a no-op.
	///
	/// # Errors
	///
	/// Returns [`ModuleError::CyclicOverride`] if the edge would close a cycle.
	pub fn add_edge(&mut self, overridden: &str, overriding: &str) -> Result<(), ModuleError> {
		if overridden == overriding || self.has_path(overriding, overridden) {
			return Err(ModuleError::CyclicOverride {
				overridden: overridden.to_string(),
				overriding: overriding.to_string(),
			});
		}
		self.add_module(overriding);
		self.edges.entry(overridden.to_string()).or_default().insert(overriding.to_string());
		Ok(())
	}

	pub fn remove_edge(&mut self, overridden: &str, overriding: &str) {
		if let Some(targets) = self.edges.get_mut(overridden) {
			targets.shift_remove(overriding);
		}
	}

	pub fn has_edge(&self, overridden: &str, overriding: &str) -> bool {
		self.edges.get(overridden).is_some_and(|targets| targets.contains(overriding))
	}

	/// Returns true if `to` overrides `from`, directly or transitively.
	pub fn has_path(&self, from: &str, to: &str) -> bool {
		let mut stack = vec![from];
		let mut visited = FxHashSet::default();
		while let Some(current) = stack.pop() {
			if !visited.insert(current) {
				continue;
			}
			let Some(targets) = self.edges.get(current) else {
				continue;
			};
			for target in targets {
				if target == to {
					return true;
				}
				stack.push(target.as_str());
			}
		}
		false
	}

	/// Returns true if either module overrides the other.
	pub fn are_ordered(&self, a: &str, b: &str) -> bool {
		self.has_path(a, b) || self.has_path(b, a)
	}
}
