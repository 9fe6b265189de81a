use super::{ReplacementPolicy, SetView};

use std::hash::Hash;

/// Evicts the least recently used key, the tail of the set's recency list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lru;

impl<K, V> ReplacementPolicy<K, V> for Lru
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn select(&self, set: &SetView<'_, K, V>) -> K {
    match set.least_recent() {
      Some(key) => key.clone(),
      None => unreachable!("replacement policy invoked on an empty set"),
    }
  }
}
