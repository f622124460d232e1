use std::collections::HashMap;

use proptest::prelude::*;

use super::*;

fn sample() -> CompositeIndex<u32> {
	let mut index = CompositeIndex::new();
	index.set("beta", "m1", 1);
	index.set("alpha", "m2", 2);
	index.set("beta", "m3", 3);
	index.set("gamma", "m1", 4);
	index
}

#[test]
fn get_returns_value_for_pair() {
	let index = sample();
	assert_eq!(index.get("beta", "m3"), Ok(&3));
	assert_eq!(
		index.get("beta", "m2"),
		Err(IndexError::EntryNotFound {
			primary: "beta".into(),
			secondary: "m2".into()
		})
	);
	assert!(matches!(index.get("delta", "m1"), Err(IndexError::EntryNotFound { .. })));
}

#[test]
fn set_overwrites_in_place() {
	let mut index = sample();
	assert_eq!(index.set("beta", "m1", 10), Some(1));
	assert_eq!(index.secondary_keys_of("beta").unwrap(), vec!["m1", "m3"]);
	assert_eq!(index.first("beta"), Ok(&10));
	assert_eq!(index.len(), 4);
}

#[test]
fn first_and_last_follow_insertion_order() {
	let index = sample();
	assert_eq!(index.first("beta"), Ok(&1));
	assert_eq!(index.last("beta"), Ok(&3));
	assert_eq!(index.first("alpha"), index.last("alpha"));
	assert_eq!(index.first("delta"), Err(IndexError::PrimaryNotFound { primary: "delta".into() }));
	assert!(index.last("delta").is_err());
}

#[test]
fn removing_last_entry_drops_bucket() {
	let mut index = sample();
	assert_eq!(index.remove("alpha", "m2"), Some(2));
	assert!(!index.contains("alpha"));
	assert!(index.list_by_primary("alpha").is_err());
	assert_eq!(index.primary_keys(), vec!["beta", "gamma"]);
}

#[test]
fn remove_of_absent_keys_is_noop() {
	let mut index = sample();
	assert_eq!(index.remove("beta", "m9"), None);
	assert_eq!(index.remove("delta", "m1"), None);
	assert!(index.remove_all("delta").is_none());
	assert_eq!(index, sample());
}

#[test]
fn remove_all_drops_every_secondary() {
	let mut index = sample();
	let removed = index.remove_all("beta").unwrap();
	assert_eq!(removed.keys().collect::<Vec<_>>(), vec!["m1", "m3"]);
	assert!(!index.contains_entry("beta", "m1"));
	assert_eq!(index.len(), 2);
}

#[test]
fn contains_never_fails() {
	let index = sample();
	assert!(index.contains("gamma"));
	assert!(!index.contains("delta"));
	assert!(index.contains_entry("gamma", "m1"));
	assert!(!index.contains_entry("gamma", "m2"));
	assert!(!index.contains_entry("delta", "m2"));
}

#[test]
fn all_secondary_keys_is_deduplicated() {
	let index = sample();
	let mut keys = index.all_secondary_keys();
	keys.sort_unstable();
	assert_eq!(keys, vec!["m1", "m2", "m3"]);
	assert!(index.secondary_keys_of("delta").is_err());
}

#[test]
fn sort_primary_keys_lexicographic() {
	let mut index = sample();
	index.sort_primary_keys(None);
	assert_eq!(index.primary_keys(), vec!["alpha", "beta", "gamma"]);
}

#[test]
fn sort_primary_keys_with_explicit_order() {
	let mut index = sample();
	index.sort_primary_keys(Some(&["gamma", "missing", "alpha"][..]));
	assert_eq!(index.primary_keys(), vec!["gamma", "alpha", "beta"]);
}

#[test]
fn sort_secondary_keys_keeps_unlisted_keys_after() {
	let mut index = CompositeIndex::new();
	for module in ["d", "c", "b", "a"] {
		index.set("type", module, module.to_uppercase());
	}
	index.sort_secondary_keys("type", Some(&["b", "x", "d"][..])).unwrap();
	assert_eq!(index.secondary_keys_of("type").unwrap(), vec!["b", "d", "c", "a"]);
	assert_eq!(index.first("type").unwrap(), "B");

	index.sort_secondary_keys("type", None).unwrap();
	assert_eq!(index.secondary_keys_of("type").unwrap(), vec!["a", "b", "c", "d"]);

	assert!(index.sort_secondary_keys("nope", None).is_err());
}

#[test]
fn iter_yields_triples_in_order() {
	let index = sample();
	let triples: Vec<_> = index.iter().map(|(p, s, v)| (p, s, *v)).collect();
	assert_eq!(triples, vec![("beta", "m1", 1), ("beta", "m3", 3), ("alpha", "m2", 2), ("gamma", "m1", 4)]);
	assert_eq!(index.values().copied().collect::<Vec<_>>(), vec![1, 3, 2, 4]);
}

#[derive(Debug, Clone)]
enum Op {
	Set(u8, u8, u32),
	Remove(u8, u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0u8..4, 0u8..4, any::<u32>()).prop_map(|(p, s, v)| Op::Set(p, s, v)),
		(0u8..4, 0u8..4).prop_map(|(p, s)| Op::Remove(p, s)),
	]
}

proptest! {
	/// `get` always returns the most recent `set` for a pair unless removed since.
	#[test]
	fn prop_round_trip(ops in proptest::collection::vec(arb_op(), 0..64)) {
		let mut index = CompositeIndex::new();
		let mut model: HashMap<(u8, u8), u32> = HashMap::new();

		for op in ops {
			match op {
				Op::Set(p, s, v) => {
					index.set(p.to_string(), s.to_string(), v);
					model.insert((p, s), v);
				}
				Op::Remove(p, s) => {
					index.remove(&p.to_string(), &s.to_string());
					model.remove(&(p, s));
				}
			}
		}

		for p in 0u8..4 {
			let has_any = model.keys().any(|(mp, _)| *mp == p);
			prop_assert_eq!(index.contains(&p.to_string()), has_any);
			for s in 0u8..4 {
				let got = index.get(&p.to_string(), &s.to_string()).ok().copied();
				prop_assert_eq!(got, model.get(&(p, s)).copied());
			}
		}
		prop_assert_eq!(index.len(), model.len());
	}
}

#[test]
fn take_and_restore_preserve_positions() {
	let mut index = sample();
	let original = index.clone();

	let entry = index.take("beta", "m1").unwrap();
	assert_eq!(entry.value(), &1);
	assert_eq!(index.first("beta"), Ok(&3));
	index.restore(entry);
	assert_eq!(index.secondary_keys_of("beta").unwrap(), vec!["m1", "m3"]);

	let entry = index.take("alpha", "m2").unwrap();
	assert_eq!(index.primary_keys(), vec!["beta", "gamma"]);
	index.restore(entry);
	assert_eq!(index.primary_keys(), vec!["beta", "alpha", "gamma"]);
	assert_eq!(index.iter().collect::<Vec<_>>(), original.iter().collect::<Vec<_>>());

	assert!(index.take("alpha", "m9").is_none());
	assert!(index.take("delta", "m1").is_none());
}

#[test]
fn values_by_primary_mut_updates_in_place() {
	let mut index = sample();
	for value in index.values_by_primary_mut("beta").unwrap() {
		*value += 100;
	}
	assert_eq!(index.get("beta", "m1"), Ok(&101));
	assert_eq!(index.get("beta", "m3"), Ok(&103));
	assert_eq!(index.get("alpha", "m2"), Ok(&2));
	assert!(index.values_by_primary_mut("delta").is_err());
}
