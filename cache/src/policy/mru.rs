use super::{ReplacementPolicy, SetView};

use std::hash::Hash;

/// Evicts the most recently used key, the head of the set's recency list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mru;

impl<K, V> ReplacementPolicy<K, V> for Mru
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn select(&self, set: &SetView<'_, K, V>) -> K {
    match set.most_recent() {
      Some(key) => key.clone(),
      None => unreachable!("replacement policy invoked on an empty set"),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::set::CacheSet;
  use std::sync::Arc;

  #[test]
  fn selects_head() {
    let mut set = CacheSet::new(0, 3);
    for key in ["a", "b", "c"] {
      set.insert_at_head(key, Arc::new(0));
    }
    set.move_to_head(&"a");
    assert_eq!(Mru.select(&SetView::new(&set)), "a");
  }
}
