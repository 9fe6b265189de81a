//! A concurrent, in-memory, N-way set-associative cache.
//!
//! Keys are spread over N sets, each holding at most `lines_per_set`
//! entries and owned by its own worker thread. Callers never touch a set
//! directly: `put` and `get` enqueue jobs on one shared FIFO queue, every
//! worker inspects the head job, the worker that owns the key (or, for a new
//! key, whichever worker wins the write lock) commits it, and all workers
//! meet at a barrier before the next job is looked at.
//!
//! # Features
//! - **Per-set ownership**: a set's entries and recency list are only ever
//!   touched by its worker, so the recency list needs no locking.
//! - **Pluggable replacement**: LRU, MRU, random, or any
//!   [`ReplacementPolicy`] / closure over a [`SetView`].
//! - **Blocking reads without lost wakeups**: each `get` waits on its own
//!   reply channel, created before the request is queued.
//! - **Observability**: lock-free counters exposed as a [`MetricsSnapshot`].
//!
//! Placement of a new key is decided by which worker wins the race for the
//! write lock, not by hashing the key, so the same key may end up in
//! different sets from one run to the next.
//!
//! ```
//! use fibre_nway::{Cache, CacheError};
//!
//! let cache = Cache::new(4, "LRU", 32).unwrap();
//! cache.put("answer", 42);
//! assert_eq!(*cache.get(&"answer").unwrap(), 42);
//! assert_eq!(cache.get(&"question"), Err(CacheError::NotFound));
//! ```

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod metrics;
pub mod policy;

// Internal, crate-only modules
mod job;
mod set;
mod shared;
mod sync;
mod task;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use error::{BuildError, CacheError};
pub use handles::Cache;
pub use metrics::MetricsSnapshot;
pub use policy::{Replacement, ReplacementPolicy, SetView};
