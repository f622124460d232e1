use indexmap::{IndexMap, IndexSet};

use super::OverrideGraph;

/// Modules claiming the same token without an override relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConflict {
	pub token: String,
	/// Conflicting module names, sorted.
	pub modules: Vec<String>,
}

/// Tracks which modules claim which tokens and reports unordered claims.
///
/// Claims are counted: a module claiming the same token twice must release it
/// twice before the claim disappears.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
	overrides: OverrideGraph,
	claims: IndexMap<String, IndexMap<String, usize>>,
}

impl ConflictDetector {
	pub fn new(overrides: OverrideGraph) -> Self {
		Self {
			overrides,
			claims: IndexMap::new(),
		}
	}

	pub fn overrides(&self) -> &OverrideGraph {
		&self.overrides
	}

	/// Replaces the override graph, keeping every claim.
	pub fn set_overrides(&mut self, overrides: OverrideGraph) {
		self.overrides = overrides;
	}

	pub fn claim(&mut self, token: &str, module: &str) {
		*self.claims.entry(token.to_string()).or_default().entry(module.to_string()).or_default() += 1;
	}

	pub fn release(&mut self, token: &str, module: &str) {
		let Some(claimants) = self.claims.get_mut(token) else {
			return;
		};
		if let Some(count) = claimants.get_mut(module) {
			*count -= 1;
			if *count == 0 {
				claimants.shift_remove(module);
			}
		}
		if claimants.is_empty() {
			self.claims.shift_remove(token);
		}
	}

	/// Drops every claim held by `module`.
	pub fn release_module(&mut self, module: &str) {
		self.claims.retain(|_, claimants| {
			claimants.shift_remove(module);
			!claimants.is_empty()
		});
	}

	/// Modules currently claiming `token`, in first-claim order.
	pub fn claimants(&self, token: &str) -> Vec<&str> {
		self.claims
			.get(token)
			.map(|claimants| claimants.keys().map(String::as_str).collect())
			.unwrap_or_default()
	}

	/// Every claimed token in first-claim order.
	pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
		self.claims.keys().map(String::as_str)
	}

	/// Reports conflicts among the claims of the given tokens.
	///
	/// Two claimants of a token conflict unless one overrides the other. Each
	/// token is reported at most once.
	pub fn detect_conflicts<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> Vec<ModuleConflict> {
		let mut seen = IndexSet::new();
		let mut conflicts = Vec::new();
		for token in tokens {
			if !seen.insert(token) {
				continue;
			}
			if let Some(conflict) = self.detect_token(token) {
				conflicts.push(conflict);
			}
		}
		conflicts
	}

	/// Reports conflicts across every claimed token.
	pub fn detect_all_conflicts(&self) -> Vec<ModuleConflict> {
		self.claims.keys().filter_map(|token| self.detect_token(token)).collect()
	}

	fn detect_token(&self, token: &str) -> Option<ModuleConflict> {
		let claimants: Vec<&String> = self.claims.get(token)?.keys().collect();
		if claimants.len() < 2 {
			return None;
		}

		let mut conflicting = IndexSet::new();
		for (i, a) in claimants.iter().enumerate() {
			for b in &claimants[i + 1..] {
				if !self.overrides.are_ordered(a, b) {
					conflicting.insert(a.as_str());
					conflicting.insert(b.as_str());
				}
			}
		}
		if conflicting.is_empty() {
			return None;
		}

		let mut modules: Vec<String> = conflicting.into_iter().map(str::to_string).collect();
		modules.sort();
		Some(ModuleConflict {
			token: token.to_string(),
			modules,
		})
	}
}
