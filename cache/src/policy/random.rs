#![cfg(feature = "random")]

use super::{ReplacementPolicy, SetView};

use rand::seq::IteratorRandom;
use std::hash::Hash;

/// Evicts a uniformly random resident key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReplacement;

impl<K, V> ReplacementPolicy<K, V> for RandomReplacement
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn select(&self, set: &SetView<'_, K, V>) -> K {
    let mut rng = rand::rng();
    match set.keys().choose(&mut rng) {
      Some(key) => key.clone(),
      None => unreachable!("replacement policy invoked on an empty set"),
    }
  }
}
