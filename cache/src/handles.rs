use crate::builder::CacheBuilder;
use crate::error::{BuildError, CacheError};
use crate::job::{Job, Lookup};
use crate::shared::CacheShared;
use crate::MetricsSnapshot;

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::thread::JoinHandle;

use fibre::mpsc;
use tracing::{debug, warn};

/// A thread-safe, N-way set-associative cache.
///
/// Every set is owned by a dedicated worker thread. `put` and `get` enqueue
/// jobs on a shared FIFO queue that the workers drain one job per round.
/// Wrap the cache in an `Arc` to share it between threads.
pub struct Cache<K, V: Send + Sync> {
  pub(crate) shared: Arc<CacheShared<K, V>>,
  pub(crate) workers: Vec<JoinHandle<()>>,
}

impl<K, V> Cache<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Creates a cache with `set_count` sets of `lines_per_set` lines each,
  /// using a built-in replacement policy named `replacement` (`"LRU"` or
  /// `"MRU"`, case-insensitive).
  ///
  /// Use [`Cache::builder`] to supply a custom policy.
  pub fn new(set_count: usize, replacement: &str, lines_per_set: usize) -> Result<Self, BuildError> {
    CacheBuilder::new()
      .sets(set_count)
      .lines_per_set(lines_per_set)
      .replacement_name(replacement)
      .build()
  }

  pub fn builder() -> CacheBuilder<K, V> {
    CacheBuilder::new()
  }

  /// Queues an insert or update of `key` and returns immediately.
  ///
  /// The write lands when a worker reaches the job; any later `get` from any
  /// thread observes it, since jobs are committed in FIFO order.
  pub fn put(&self, key: K, value: V) {
    let job = Job::Put {
      key,
      value: Arc::new(value),
    };
    if !self.shared.enqueue(job) {
      warn!("put on a cache that is shutting down was dropped");
    }
  }

  /// Looks up `key`, blocking until the owning worker answers.
  ///
  /// Returns [`CacheError::NotFound`] if the key is absent when the request
  /// reaches the head of the queue, which may be later than when it was issued.
  pub fn get(&self, key: &K) -> Result<Arc<V>, CacheError> {
    self.get_located(key).map(|(_, value)| value)
  }

  /// Like [`Cache::get`], also returning the index of the set holding the key.
  pub fn get_located(&self, key: &K) -> Result<(usize, Arc<V>), CacheError> {
    // The reply channel exists before the job is visible to any worker, so
    // an answer published before we start waiting is not lost.
    let (reply, answer) = mpsc::bounded(1);
    let job = Job::Get {
      key: key.clone(),
      reply,
    };
    if !self.shared.enqueue(job) {
      return Err(CacheError::Disconnected);
    }

    match answer.recv() {
      Ok(Lookup::Found { set, value }) => Ok((set, value)),
      Ok(Lookup::NotFound) => Err(CacheError::NotFound),
      Err(_) => Err(CacheError::Disconnected),
    }
  }

  /// Blocks until every job queued before this call has been committed.
  pub fn flush(&self) -> Result<(), CacheError> {
    let (done, finished) = mpsc::bounded(1);
    if !self.shared.enqueue(Job::Flush { done }) {
      return Err(CacheError::Disconnected);
    }
    finished.recv().map_err(|_| CacheError::Disconnected)
  }

  /// The index of the set currently holding `key`, if it is resident.
  ///
  /// Jobs still waiting in the queue are not taken into account.
  pub fn locate<Q>(&self, key: &Q) -> Option<usize>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.shared.key_index.read().get(key).copied()
  }

  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.shared.key_index.read().contains_key(key)
  }

  /// The number of resident entries across all sets.
  pub fn len(&self) -> usize {
    self.shared.key_index.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The number of entries in set `set`, or `None` if there is no such set.
  pub fn set_len(&self, set: usize) -> Option<usize> {
    (set < self.set_count()).then(|| self.shared.set_len(set))
  }

  pub fn set_count(&self) -> usize {
    self.shared.set_count()
  }

  pub fn lines_per_set(&self) -> usize {
    self.shared.lines_per_set
  }

  /// Total number of lines, `set_count * lines_per_set`.
  pub fn capacity(&self) -> usize {
    self.set_count() * self.lines_per_set()
  }

  /// Jobs enqueued but not yet committed.
  pub fn pending_jobs(&self) -> usize {
    self.shared.queue.len()
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}

impl<K, V: Send + Sync> fmt::Debug for Cache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cache")
      .field("shared", &self.shared)
      .field("workers", &self.workers.len())
      .finish()
  }
}

impl<K, V: Send + Sync> Drop for Cache<K, V> {
  fn drop(&mut self) {
    self.shared.shutdown();
    for worker in self.workers.drain(..) {
      if worker.join().is_err() {
        warn!("a set worker had panicked before shutdown");
      }
    }
    debug!("cache workers joined");
  }
}
