pub mod lru;
pub mod mru;
#[cfg(feature = "random")]
pub mod random;

use crate::error::BuildError;
use crate::set::CacheSet;

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

pub use crate::set::Keys;

/// A read-only view of a full set, handed to a [`ReplacementPolicy`] when a
/// new key has to make room.
pub struct SetView<'a, K, V> {
  set: &'a CacheSet<K, V>,
}

impl<'a, K: Eq + Hash + Clone, V> SetView<'a, K, V> {
  pub(crate) fn new(set: &'a CacheSet<K, V>) -> Self {
    Self { set }
  }

  /// The index of the set, in `0..set_count`.
  pub fn set_index(&self) -> usize {
    self.set.index()
  }

  pub fn len(&self) -> usize {
    self.set.len()
  }

  pub fn is_empty(&self) -> bool {
    self.set.is_empty()
  }

  /// The number of lines in the set.
  pub fn capacity(&self) -> usize {
    self.set.capacity()
  }

  pub fn contains(&self, key: &K) -> bool {
    self.set.contains(key)
  }

  /// The most recently used key.
  pub fn most_recent(&self) -> Option<&'a K> {
    self.set.head_key()
  }

  /// The least recently used key.
  pub fn least_recent(&self) -> Option<&'a K> {
    self.set.tail_key()
  }

  /// Keys ordered from most to least recently used.
  pub fn keys(&self) -> Keys<'a, K, V> {
    self.set.keys()
  }
}

impl<K: Eq + Hash + Clone + fmt::Debug, V> fmt::Debug for SetView<'_, K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SetView")
      .field("set_index", &self.set_index())
      .field("len", &self.len())
      .field("capacity", &self.capacity())
      .finish_non_exhaustive()
  }
}

/// Chooses which key leaves a full set.
///
/// `select` is only ever called with a full, non-empty set, on the worker
/// thread that owns the set, before the write lock is taken. It must return a
/// key that is currently resident in `set`. If it does not, the worker falls
/// back to the least recently used key.
pub trait ReplacementPolicy<K, V>: Send + Sync {
  fn select(&self, set: &SetView<'_, K, V>) -> K;
}

impl<K, V, F> ReplacementPolicy<K, V> for F
where
  F: Fn(&SetView<'_, K, V>) -> K + Send + Sync,
{
  fn select(&self, set: &SetView<'_, K, V>) -> K {
    self(set)
  }
}

/// The replacement algorithm a cache is configured with.
pub enum Replacement<K, V> {
  /// Evict the least recently used key.
  Lru,
  /// Evict the most recently used key.
  Mru,
  /// Evict a uniformly random key.
  #[cfg(feature = "random")]
  Random,
  /// A caller-supplied policy.
  Custom(Arc<dyn ReplacementPolicy<K, V>>),
}

impl<K, V> Replacement<K, V> {
  pub fn custom<P>(policy: P) -> Self
  where
    P: ReplacementPolicy<K, V> + 'static,
  {
    Replacement::Custom(Arc::new(policy))
  }

  pub(crate) fn into_policy(self) -> Arc<dyn ReplacementPolicy<K, V>>
  where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
  {
    match self {
      Replacement::Lru => Arc::new(lru::Lru),
      Replacement::Mru => Arc::new(mru::Mru),
      #[cfg(feature = "random")]
      Replacement::Random => Arc::new(random::RandomReplacement),
      Replacement::Custom(policy) => policy,
    }
  }
}

impl<K, V> Default for Replacement<K, V> {
  fn default() -> Self {
    Replacement::Lru
  }
}

impl<K, V> Clone for Replacement<K, V> {
  fn clone(&self) -> Self {
    match self {
      Replacement::Lru => Replacement::Lru,
      Replacement::Mru => Replacement::Mru,
      #[cfg(feature = "random")]
      Replacement::Random => Replacement::Random,
      Replacement::Custom(policy) => Replacement::Custom(policy.clone()),
    }
  }
}

impl<K, V> fmt::Debug for Replacement<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Replacement::Lru => write!(f, "Lru"),
      Replacement::Mru => write!(f, "Mru"),
      #[cfg(feature = "random")]
      Replacement::Random => write!(f, "Random"),
      Replacement::Custom(_) => write!(f, "Custom(..)"),
    }
  }
}

/// Parses a built-in policy name, ignoring case.
impl<K, V> FromStr for Replacement<K, V> {
  type Err = BuildError;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    match name.trim().to_ascii_uppercase().as_str() {
      "LRU" => Ok(Replacement::Lru),
      "MRU" => Ok(Replacement::Mru),
      #[cfg(feature = "random")]
      "RANDOM" => Ok(Replacement::Random),
      _ => Err(BuildError::UnknownPolicy(name.to_string())),
    }
  }
}
