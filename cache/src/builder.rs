use crate::error::BuildError;
use crate::handles::Cache;
use crate::policy::{Replacement, ReplacementPolicy};
use crate::shared::CacheShared;
use crate::task::worker::SetWorker;

use core::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

/// Lines per set when none is configured.
pub const DEFAULT_LINES_PER_SET: usize = 32;

/// A builder for creating [`Cache`] instances.
pub struct CacheBuilder<K, V> {
  pub(crate) sets: usize,
  pub(crate) lines_per_set: usize,
  replacement: Replacement<K, V>,
  // An unparseable policy name, reported by `build`.
  invalid_policy: Option<BuildError>,
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("sets", &self.sets)
      .field("lines_per_set", &self.lines_per_set)
      .field("replacement", &self.replacement)
      .finish_non_exhaustive()
  }
}

impl<K, V> CacheBuilder<K, V> {
  /// Creates a builder with one set per CPU, 32 lines per set and LRU
  /// replacement.
  pub fn new() -> Self {
    Self {
      sets: num_cpus::get().max(1),
      lines_per_set: DEFAULT_LINES_PER_SET,
      replacement: Replacement::Lru,
      invalid_policy: None,
    }
  }

  /// Sets the number of sets, and so the number of worker threads.
  pub fn sets(mut self, sets: usize) -> Self {
    self.sets = sets;
    self
  }

  /// Sets how many entries each set can hold.
  pub fn lines_per_set(mut self, lines: usize) -> Self {
    self.lines_per_set = lines;
    self
  }

  /// Selects the replacement algorithm.
  pub fn replacement(mut self, replacement: Replacement<K, V>) -> Self {
    self.replacement = replacement;
    self.invalid_policy = None;
    self
  }

  /// Selects a built-in replacement algorithm by name (`"LRU"`, `"MRU"`,
  /// case-insensitive). An unknown name makes `build` fail with
  /// [`BuildError::UnknownPolicy`].
  pub fn replacement_name(mut self, name: &str) -> Self {
    match name.parse() {
      Ok(replacement) => {
        self.replacement = replacement;
        self.invalid_policy = None;
      }
      Err(e) => self.invalid_policy = Some(e),
    }
    self
  }

  /// Installs a custom replacement policy. Closures of the form
  /// `Fn(&SetView<K, V>) -> K` qualify.
  pub fn replacement_policy<Policy>(self, policy: Policy) -> Self
  where
    Policy: ReplacementPolicy<K, V> + 'static,
  {
    self.replacement(Replacement::custom(policy))
  }

  fn validate(&mut self) -> Result<(), BuildError> {
    if let Some(e) = self.invalid_policy.take() {
      return Err(e);
    }
    if self.sets == 0 {
      return Err(BuildError::ZeroSets);
    }
    if self.lines_per_set == 0 {
      return Err(BuildError::ZeroLines);
    }
    Ok(())
  }
}

impl<K, V> Default for CacheBuilder<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> CacheBuilder<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Builds the cache and starts one worker thread per set.
  pub fn build(mut self) -> Result<Cache<K, V>, BuildError> {
    self.validate()?;

    let shared = Arc::new(CacheShared::new(
      self.sets,
      self.lines_per_set,
      self.replacement.into_policy(),
    ));

    let mut workers = Vec::with_capacity(self.sets);
    for index in 0..self.sets {
      match SetWorker::spawn(index, shared.clone()) {
        Ok(handle) => workers.push(handle),
        Err(e) => {
          // The rendezvous can never fill up; release whoever started.
          shared.shutdown();
          for handle in workers {
            let _ = handle.join();
          }
          return Err(e);
        }
      }
    }

    debug!(
      sets = self.sets,
      lines_per_set = self.lines_per_set,
      "n-way cache started"
    );
    Ok(Cache { shared, workers })
  }
}
