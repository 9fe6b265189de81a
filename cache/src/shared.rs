use crate::job::{Job, JobQueue};
use crate::metrics::Metrics;
use crate::policy::ReplacementPolicy;
use crate::sync::Rendezvous;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use crossbeam_utils::CachePadded;
use parking_lot::RwLock;

/// Every resident key and the index of the set that owns it.
pub(crate) type KeyIndex<K> = HashMap<K, usize>;

/// The coordinator shared by the façade and every set worker.
///
/// The write side of `key_index` is the cache's single write lock: a worker
/// holds it for every mutation of its own set, of the index, and while
/// popping the queue head.
pub(crate) struct CacheShared<K, V: Send + Sync> {
  pub(crate) key_index: RwLock<KeyIndex<K>>,
  pub(crate) queue: JobQueue<K, V>,
  pub(crate) rendezvous: Rendezvous,
  pub(crate) policy: Arc<dyn ReplacementPolicy<K, V>>,
  pub(crate) metrics: Metrics,
  // Entries per set, published by the owning worker after each commit.
  pub(crate) occupancy: Box<[CachePadded<AtomicUsize>]>,
  pub(crate) lines_per_set: usize,
}

impl<K, V: Send + Sync> fmt::Debug for CacheShared<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("set_count", &self.set_count())
      .field("lines_per_set", &self.lines_per_set)
      .field("pending_jobs", &self.queue.len())
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<K, V: Send + Sync> CacheShared<K, V> {
  pub(crate) fn new(
    set_count: usize,
    lines_per_set: usize,
    policy: Arc<dyn ReplacementPolicy<K, V>>,
  ) -> Self {
    Self {
      key_index: RwLock::new(HashMap::with_capacity(set_count * lines_per_set)),
      queue: JobQueue::new(),
      rendezvous: Rendezvous::new(set_count),
      policy,
      metrics: Metrics::new(),
      occupancy: (0..set_count)
        .map(|_| CachePadded::new(AtomicUsize::new(0)))
        .collect(),
      lines_per_set,
    }
  }

  pub(crate) fn set_count(&self) -> usize {
    self.occupancy.len()
  }

  pub(crate) fn set_len(&self, set: usize) -> usize {
    self.occupancy[set].load(Ordering::Acquire)
  }

  pub(crate) fn publish_set_len(&self, set: usize, len: usize) {
    self.occupancy[set].store(len, Ordering::Release);
  }

  /// Queues a job and counts it. Returns `false` if the cache is shutting down.
  pub(crate) fn enqueue(&self, job: Job<K, V>) -> bool {
    // Counted first so `jobs_committed` never overtakes it.
    Metrics::bump(&self.metrics.jobs_enqueued);
    let accepted = self.queue.append(job);
    if !accepted {
      self.metrics.jobs_enqueued.fetch_sub(1, Ordering::Relaxed);
    }
    accepted
  }

  /// Releases every worker from its current wait so it can exit.
  pub(crate) fn shutdown(&self) {
    self.queue.close();
    self.rendezvous.close();
  }
}
