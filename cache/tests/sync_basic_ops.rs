mod common;

use common::{assert_invariants, build_test_cache, single_set_cache};
use fibre_nway::{Cache, CacheError, Replacement};
use std::sync::Arc;

#[test]
fn test_sync_read_your_write() {
  let cache = build_test_cache(4, 8);
  cache.put(1, 100);
  assert_eq!(cache.get(&1), Ok(Arc::new(100)));

  let metrics = cache.metrics();
  assert_eq!(metrics.inserts, 1);
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.misses, 0);
}

#[test]
fn test_sync_update_in_place() {
  let cache = single_set_cache(2, Replacement::Lru);
  cache.put("k", 1);
  cache.put("other", 2);
  cache.put("k", 3);
  assert_eq!(cache.get(&"k"), Ok(Arc::new(3)));
  assert_eq!(cache.len(), 2, "an update must not add an entry");

  // "k" was touched last, so the next insert pushes out "other".
  cache.put("new", 4);
  assert_eq!(cache.get(&"other"), Err(CacheError::NotFound));
  assert_eq!(cache.get(&"k"), Ok(Arc::new(3)));

  let metrics = cache.metrics();
  assert_eq!(metrics.updates, 1);
  assert_eq!(metrics.inserts, 3);
  assert_eq!(metrics.evictions, 1);
}

#[test]
fn test_sync_update_moves_key_to_most_recent() {
  let cache = single_set_cache(2, Replacement::Lru);
  cache.put("a", 1);
  cache.put("b", 2);
  // Re-putting "a" makes it most recent, "b" becomes the LRU victim.
  cache.put("a", 10);
  cache.put("c", 3);

  assert_eq!(cache.get(&"b"), Err(CacheError::NotFound));
  assert_eq!(cache.get(&"a"), Ok(Arc::new(10)));
  assert_eq!(cache.get(&"c"), Ok(Arc::new(3)));
}

#[test]
fn test_sync_miss_does_not_hang_for_any_set_count() {
  for sets in [1, 2, 3, 4, 8] {
    let cache = build_test_cache(sets, 4);
    assert_eq!(cache.get(&42), Err(CacheError::NotFound), "sets = {sets}");

    cache.put(1, 1);
    assert_eq!(cache.get(&2), Err(CacheError::NotFound), "sets = {sets}");
    assert_eq!(cache.metrics().misses, 2);
  }
}

#[test]
fn test_sync_get_located_agrees_with_locate() {
  let cache = build_test_cache(4, 4);
  for key in 0..8 {
    cache.put(key, key * 10);
  }
  cache.flush().unwrap();

  for key in 0..8 {
    match cache.get_located(&key) {
      Ok((set, value)) => {
        assert_eq!(*value, key * 10);
        assert_eq!(cache.locate(&key), Some(set));
        assert!(set < cache.set_count());
      }
      Err(CacheError::NotFound) => assert_eq!(cache.locate(&key), None),
      Err(e) => panic!("unexpected error {e}"),
    }
  }
}

#[test]
fn test_sync_flush_reaches_quiescence() {
  let cache = build_test_cache(3, 16);
  for key in 0..30 {
    cache.put(key, key);
  }
  cache.flush().unwrap();

  assert_eq!(cache.pending_jobs(), 0);
  assert!(cache.contains_key(&29));
  assert!(!cache.is_empty());
  assert_invariants(&cache);
}

#[test]
fn test_sync_introspection() {
  let cache = build_test_cache(3, 5);
  assert_eq!(cache.set_count(), 3);
  assert_eq!(cache.lines_per_set(), 5);
  assert_eq!(cache.capacity(), 15);
  assert!(cache.is_empty());
  assert_eq!(cache.set_len(0), Some(0));
  assert_eq!(cache.set_len(3), None);
  assert_eq!(cache.locate(&7), None);
}

#[test]
fn test_sync_non_clone_values() {
  struct Blob(Vec<u8>);

  let cache: Cache<u32, Blob> = Cache::new(2, "lru", 4).unwrap();
  cache.put(7, Blob(vec![1, 2, 3]));
  let blob = cache.get(&7).unwrap();
  assert_eq!(blob.0, vec![1, 2, 3]);
}

#[test]
fn test_sync_new_rejects_unknown_policy() {
  let result: Result<Cache<u8, u8>, _> = Cache::new(2, "LFU", 4);
  assert!(matches!(result, Err(fibre_nway::BuildError::UnknownPolicy(name)) if name == "LFU"));
}

#[test]
fn test_sync_drop_stops_workers() {
  // Dropping joins every worker; this test hangs if one is left behind.
  for _ in 0..10 {
    let cache = build_test_cache(4, 2);
    cache.put(1, 1);
    drop(cache);
  }
}
