//! Two-level composite key index.
//!
//! # Purpose
//!
//! Metadata throughout the workspace is looked up by an entity name plus the
//! module that declared it: binding types by `(type name, module)`, path
//! mappings by `(repository path, module)`. [`CompositeIndex`] is the shared
//! store for those lookups. Asking for a primary key alone yields the first
//! value registered under it, which gives "first module wins" semantics
//! without callers having to know which modules contributed.
//!
//! # Invariants
//!
//! - A primary bucket never exists with zero secondary entries. Removing the
//!   last entry of a bucket removes the bucket.
//! - Iteration order is insertion order, both for primary keys (first-seen)
//!   and for the secondary keys inside one bucket, until explicitly re-sorted.
//! - Overwriting an existing `(primary, secondary)` pair keeps its position.

mod error;

pub use error::IndexError;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Ordered map of secondary keys to values for a single primary key.
pub type Bucket<V> = IndexMap<String, V>;

/// Store keyed by `(primary, secondary)` with insertion order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeIndex<V> {
	buckets: IndexMap<String, Bucket<V>>,
}

impl<V> Default for CompositeIndex<V> {
	fn default() -> Self {
		Self { buckets: IndexMap::new() }
	}
}

impl<V> CompositeIndex<V> {
	/// Creates an empty index.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or overwrites the value stored at `(primary, secondary)`.
	///
	/// Returns the previous value, if any.
	pub fn set(&mut self, primary: impl Into<String>, secondary: impl Into<String>, value: V) -> Option<V> {
		self.buckets.entry(primary.into()).or_default().insert(secondary.into(), value)
	}

	/// Returns the value stored at `(primary, secondary)`.
	pub fn get(&self, primary: &str, secondary: &str) -> Result<&V, IndexError> {
		self.buckets
			.get(primary)
			.and_then(|bucket| bucket.get(secondary))
			.ok_or_else(|| IndexError::entry_not_found(primary, secondary))
	}

	/// Returns a mutable reference to the value stored at `(primary, secondary)`.
	pub fn get_mut(&mut self, primary: &str, secondary: &str) -> Result<&mut V, IndexError> {
		self.buckets
			.get_mut(primary)
			.and_then(|bucket| bucket.get_mut(secondary))
			.ok_or_else(|| IndexError::entry_not_found(primary, secondary))
	}

	/// Returns the first value inserted under `primary`.
	pub fn first(&self, primary: &str) -> Result<&V, IndexError> {
		self.bucket(primary)?
			.first()
			.map(|(_, value)| value)
			.ok_or_else(|| IndexError::primary_not_found(primary))
	}

	/// Returns the last value inserted under `primary`.
	pub fn last(&self, primary: &str) -> Result<&V, IndexError> {
		self.bucket(primary)?
			.last()
			.map(|(_, value)| value)
			.ok_or_else(|| IndexError::primary_not_found(primary))
	}

	/// Returns the ordered secondary map stored under `primary`.
	pub fn list_by_primary(&self, primary: &str) -> Result<&Bucket<V>, IndexError> {
		self.bucket(primary)
	}

	/// Returns true if any value is stored under `primary`.
	pub fn contains(&self, primary: &str) -> bool {
		self.buckets.contains_key(primary)
	}

	/// Returns true if a value is stored at `(primary, secondary)`.
	pub fn contains_entry(&self, primary: &str, secondary: &str) -> bool {
		self.buckets.get(primary).is_some_and(|bucket| bucket.contains_key(secondary))
	}

	/// Removes the value stored at `(primary, secondary)`.
	///
	/// Drops the primary bucket when it becomes empty. Absent keys are a no-op.
	pub fn remove(&mut self, primary: &str, secondary: &str) -> Option<V> {
		let bucket = self.buckets.get_mut(primary)?;
		let removed = bucket.shift_remove(secondary);
		if bucket.is_empty() {
			self.buckets.shift_remove(primary);
		}
		removed
	}

	/// Removes the value at `(primary, secondary)` and remembers where it was.
	///
	/// Passing the result to [`Self::restore`] puts the value back at the same
	/// primary and secondary positions, recreating the bucket if needed.
	pub fn take(&mut self, primary: &str, secondary: &str) -> Option<RemovedEntry<V>> {
		let primary_position = self.buckets.get_index_of(primary)?;
		let bucket = &mut self.buckets[primary_position];
		let (secondary_position, secondary, value) = bucket.shift_remove_full(secondary)?;
		if bucket.is_empty() {
			self.buckets.shift_remove_index(primary_position);
		}
		Some(RemovedEntry {
			primary: primary.to_string(),
			secondary,
			value,
			primary_position,
			secondary_position,
		})
	}

	/// Re-inserts an entry previously removed with [`Self::take`].
	pub fn restore(&mut self, entry: RemovedEntry<V>) {
		let RemovedEntry {
			primary,
			secondary,
			value,
			primary_position,
			secondary_position,
		} = entry;
		if let Some(bucket) = self.buckets.get_mut(&primary) {
			let position = secondary_position.min(bucket.len());
			bucket.shift_insert(position, secondary, value);
			return;
		}
		let mut bucket = Bucket::new();
		bucket.insert(secondary, value);
		let position = primary_position.min(self.buckets.len());
		self.buckets.shift_insert(position, primary, bucket);
	}

	/// Removes every value stored under `primary`.
	pub fn remove_all(&mut self, primary: &str) -> Option<Bucket<V>> {
		self.buckets.shift_remove(primary)
	}

	/// Iterates the values stored under `primary` mutably, in bucket order.
	pub fn values_by_primary_mut(&mut self, primary: &str) -> Result<impl Iterator<Item = &mut V> + '_, IndexError> {
		let bucket = self.buckets.get_mut(primary).ok_or_else(|| IndexError::primary_not_found(primary))?;
		Ok(bucket.values_mut())
	}

	/// Returns the secondary keys stored under `primary` in insertion order.
	pub fn secondary_keys_of(&self, primary: &str) -> Result<Vec<&str>, IndexError> {
		Ok(self.bucket(primary)?.keys().map(String::as_str).collect())
	}

	/// Returns every secondary key across all buckets, de-duplicated.
	///
	/// No ordering is guaranteed.
	pub fn all_secondary_keys(&self) -> Vec<&str> {
		let mut seen = FxHashSet::default();
		self.buckets
			.values()
			.flat_map(|bucket| bucket.keys())
			.map(String::as_str)
			.filter(|key| seen.insert(*key))
			.collect()
	}

	/// Returns every primary key in first-seen order.
	pub fn primary_keys(&self) -> Vec<&str> {
		self.buckets.keys().map(String::as_str).collect()
	}

	/// Re-orders primary keys.
	///
	/// With an explicit `order`, keys present in both the index and the list
	/// move to the front in list order and the remaining keys follow in their
	/// previous relative order. Without one, keys sort lexicographically.
	pub fn sort_primary_keys(&mut self, order: Option<&[&str]>) {
		match order {
			Some(order) => reorder(&mut self.buckets, order),
			None => self.buckets.sort_keys(),
		}
	}

	/// Re-orders the secondary keys of one bucket, see [`Self::sort_primary_keys`].
	pub fn sort_secondary_keys(&mut self, primary: &str, order: Option<&[&str]>) -> Result<(), IndexError> {
		let bucket = self.buckets.get_mut(primary).ok_or_else(|| IndexError::primary_not_found(primary))?;
		match order {
			Some(order) => reorder(bucket, order),
			None => bucket.sort_keys(),
		}
		Ok(())
	}

	/// Iterates `(primary, secondary, value)` triples in index order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &V)> + '_ {
		self.buckets
			.iter()
			.flat_map(|(primary, bucket)| bucket.iter().map(move |(secondary, value)| (primary.as_str(), secondary.as_str(), value)))
	}

	/// Iterates values in index order.
	pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
		self.buckets.values().flat_map(|bucket| bucket.values())
	}

	/// Returns the total number of stored values.
	pub fn len(&self) -> usize {
		self.buckets.values().map(IndexMap::len).sum()
	}

	/// Returns true if no value is stored.
	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}

	/// Removes every value.
	pub fn clear(&mut self) {
		self.buckets.clear();
	}

	fn bucket(&self, primary: &str) -> Result<&Bucket<V>, IndexError> {
		self.buckets.get(primary).ok_or_else(|| IndexError::primary_not_found(primary))
	}
}

/// An entry removed by [`CompositeIndex::take`], restorable in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry<V> {
	primary: String,
	secondary: String,
	value: V,
	primary_position: usize,
	secondary_position: usize,
}

impl<V> RemovedEntry<V> {
	pub fn primary(&self) -> &str {
		&self.primary
	}

	pub fn secondary(&self) -> &str {
		&self.secondary
	}

	pub fn value(&self) -> &V {
		&self.value
	}

	pub fn value_mut(&mut self) -> &mut V {
		&mut self.value
	}
}

fn reorder<V>(map: &mut IndexMap<String, V>, order: &[&str]) {
	let mut rest = std::mem::take(map);
	for key in order {
		if let Some((key, value)) = rest.shift_remove_entry(*key) {
			map.insert(key, value);
		}
	}
	map.extend(rest);
}

#[cfg(test)]
mod tests;
