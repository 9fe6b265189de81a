#![allow(dead_code)]

use fibre_nway::{Cache, CacheBuilder, Replacement};

/// A cache with a single set, so every key competes for the same lines and
/// eviction order is fully deterministic.
pub fn single_set_cache(lines: usize, replacement: Replacement<&'static str, i32>) -> Cache<&'static str, i32> {
  CacheBuilder::new()
    .sets(1)
    .lines_per_set(lines)
    .replacement(replacement)
    .build()
    .unwrap()
}

pub fn build_test_cache(sets: usize, lines: usize) -> Cache<u64, u64> {
  CacheBuilder::new()
    .sets(sets)
    .lines_per_set(lines)
    .build()
    .unwrap()
}

/// Asserts the structural invariants that must hold at any quiescent point.
pub fn assert_invariants<K, V>(cache: &Cache<K, V>)
where
  K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  cache.flush().unwrap();
  let mut total = 0;
  for set in 0..cache.set_count() {
    let len = cache.set_len(set).unwrap();
    assert!(
      len <= cache.lines_per_set(),
      "set {set} holds {len} entries, more than {} lines",
      cache.lines_per_set()
    );
    total += len;
  }
  assert_eq!(total, cache.len(), "key index disagrees with set occupancy");
  assert!(cache.len() <= cache.capacity());

  let metrics = cache.metrics();
  assert_eq!(metrics.jobs_committed, metrics.jobs_enqueued);
}
