use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// The replacement policy name did not match any built-in policy.
  #[error("unknown replacement policy '{0}', expected LRU, MRU or a custom policy")]
  UnknownPolicy(String),
  /// The cache was configured with zero sets. Every set needs a worker, so
  /// at least one is required.
  #[error("set count cannot be zero")]
  ZeroSets,
  /// The cache was configured with zero lines per set.
  #[error("lines per set cannot be zero")]
  ZeroLines,
  /// The operating system refused to start a worker thread.
  #[error("failed to spawn worker thread for set {set}: {reason}")]
  WorkerSpawn { set: usize, reason: String },
}

/// Errors returned by cache operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
  /// The key was not resident when its request reached the head of the queue.
  #[error("key is not present in the cache")]
  NotFound,
  /// The workers shut down before the request was answered.
  #[error("cache workers disconnected before answering")]
  Disconnected,
}
