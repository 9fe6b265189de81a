use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the cache.
/// All fields are atomic so workers can bump them without further locking.
#[derive(Debug)]
pub struct Metrics {
  // --- Job flow ---
  pub(crate) jobs_enqueued: CachePadded<AtomicU64>,
  pub(crate) jobs_committed: CachePadded<AtomicU64>,
  pub(crate) lost_claims: CachePadded<AtomicU64>,

  // --- Hit/Miss Ratios ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Writes ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) updates: CachePadded<AtomicU64>,
  pub(crate) evictions: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      jobs_enqueued: CachePadded::new(AtomicU64::new(0)),
      jobs_committed: CachePadded::new(AtomicU64::new(0)),
      lost_claims: CachePadded::new(AtomicU64::new(0)),
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      updates: CachePadded::new(AtomicU64::new(0)),
      evictions: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn bump(counter: &CachePadded<AtomicU64>) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    MetricsSnapshot {
      jobs_enqueued: self.jobs_enqueued.load(Ordering::Relaxed),
      jobs_committed: self.jobs_committed.load(Ordering::Relaxed),
      lost_claims: self.lost_claims.load(Ordering::Relaxed),
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      updates: self.updates.load(Ordering::Relaxed),
      evictions: self.evictions.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Clone, PartialEq)]
pub struct MetricsSnapshot {
  /// Jobs handed to the queue by `put`, `get` and `flush`.
  pub jobs_enqueued: u64,
  /// Jobs committed and popped by a worker. Equal to `jobs_enqueued` once the
  /// queue has drained.
  pub jobs_committed: u64,
  /// Commit attempts abandoned because another worker had already taken the job.
  pub lost_claims: u64,
  /// The number of `get`s that found their key.
  pub hits: u64,
  /// The number of `get`s that did not.
  pub misses: u64,
  /// The cache hit ratio (hits / (hits + misses)).
  pub hit_ratio: f64,
  /// `put`s that created a new entry.
  pub inserts: u64,
  /// `put`s that replaced the value of a resident key.
  pub updates: u64,
  /// Entries removed to make room for an insert.
  pub evictions: u64,
  /// Seconds since the cache was built.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("jobs_enqueued", &self.jobs_enqueued)
      .field("jobs_committed", &self.jobs_committed)
      .field("lost_claims", &self.lost_claims)
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format_args!("{:.2}%", self.hit_ratio * 100.0))
      .field("inserts", &self.inserts)
      .field("updates", &self.updates)
      .field("evictions", &self.evictions)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
