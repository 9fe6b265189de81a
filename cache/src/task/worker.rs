use crate::error::BuildError;
use crate::job::{Job, Lookup};
use crate::metrics::Metrics;
use crate::policy::SetView;
use crate::set::CacheSet;
use crate::shared::CacheShared;

use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use fibre::mpsc;
use tracing::{debug, error, trace, warn};

/// What a worker intends to do with the head job, decided before it takes
/// the write lock.
enum Claim<'j, K, V: Send + Sync> {
  Insert {
    key: &'j K,
    value: &'j Arc<V>,
    victim: Option<K>,
  },
  Update {
    key: &'j K,
    value: &'j Arc<V>,
  },
  Hit {
    key: &'j K,
    reply: &'j mpsc::BoundedSender<Lookup<V>>,
  },
  Miss {
    reply: &'j mpsc::BoundedSender<Lookup<V>>,
  },
  Flush {
    done: &'j mpsc::BoundedSender<()>,
  },
  /// The key lives in another set.
  NotMine,
}

/// The thread permanently bound to one set.
pub(crate) struct SetWorker<K, V: Send + Sync> {
  set: CacheSet<K, V>,
  shared: Arc<CacheShared<K, V>>,
}

impl<K, V> SetWorker<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  fn new(index: usize, shared: Arc<CacheShared<K, V>>) -> Self {
    SetWorker {
      set: CacheSet::new(index, shared.lines_per_set),
      shared,
    }
  }

  /// Spawns the worker for set `index`.
  pub(crate) fn spawn(
    index: usize,
    shared: Arc<CacheShared<K, V>>,
  ) -> Result<JoinHandle<()>, BuildError> {
    let worker = SetWorker::new(index, shared);
    thread::Builder::new()
      .name(format!("fibre-nway-set-{index}"))
      .spawn(move || worker.run())
      .map_err(|e| BuildError::WorkerSpawn {
        set: index,
        reason: e.to_string(),
      })
  }

  fn run(mut self) {
    let _guard = PanicGuard {
      set: self.set.index(),
      shared: self.shared.clone(),
    };
    debug!(set = self.set.index(), "set worker started");

    while self.shared.queue.wait_for_work() {
      if let Some(job) = self.shared.queue.peek() {
        self.process(&job);
      }

      // One job per round: nobody looks at the next head until every
      // worker has had its chance at this one.
      if !self.shared.rendezvous.wait() {
        break;
      }
    }

    debug!(set = self.set.index(), "set worker stopped");
  }

  fn process(&mut self, job: &Arc<Job<K, V>>) {
    let claim = self.claim(job);
    if matches!(claim, Claim::NotMine) {
      trace!(set = self.set.index(), kind = job.kind(), "key owned by another set");
      return;
    }
    self.commit(job, claim);
  }

  /// Decides, without the write lock, whether this worker may act on `job`.
  ///
  /// State only changes when the head job is committed, so the decision is
  /// still exact if `job` turns out to be the head under the write lock.
  fn claim<'j>(&self, job: &'j Job<K, V>) -> Claim<'j, K, V> {
    match job {
      Job::Flush { done } => Claim::Flush { done },
      Job::Put { key, value } => {
        if self.set.contains(key) {
          Claim::Update { key, value }
        } else if self.shared.key_index.read().contains_key(key) {
          Claim::NotMine
        } else {
          Claim::Insert {
            key,
            value,
            victim: self.choose_victim(),
          }
        }
      }
      Job::Get { key, reply } => {
        if self.set.contains(key) {
          Claim::Hit { key, reply }
        } else if self.shared.key_index.read().contains_key(key) {
          Claim::NotMine
        } else {
          Claim::Miss { reply }
        }
      }
    }
  }

  fn choose_victim(&self) -> Option<K> {
    if !self.set.is_full() {
      return None;
    }
    Some(self.shared.policy.select(&SetView::new(&self.set)))
  }

  fn commit(&mut self, job: &Arc<Job<K, V>>, claim: Claim<'_, K, V>) {
    let set_index = self.set.index();
    let metrics = &self.shared.metrics;
    let mut key_index = self.shared.key_index.write();

    // Somebody else committed this job while we were deciding.
    if !self.shared.queue.is_head(job) {
      Metrics::bump(&metrics.lost_claims);
      trace!(set = set_index, kind = job.kind(), "lost the claim");
      return;
    }

    let mut answer = None;
    let mut flushed = None;
    match claim {
      Claim::Insert { key, value, victim } => {
        if let Some(victim) = victim {
          let evicted = self.set.remove(&victim).or_else(|| {
            warn!(
              set = set_index,
              "replacement policy chose a key that is not in the set, evicting the least recently used instead"
            );
            self.set.evict_tail()
          });
          if let Some((evicted, _)) = evicted {
            key_index.remove(&evicted);
            Metrics::bump(&metrics.evictions);
            trace!(set = set_index, "evicted an entry");
          }
        }
        self.set.insert_at_head(key.clone(), value.clone());
        key_index.insert(key.clone(), set_index);
        Metrics::bump(&metrics.inserts);
      }
      Claim::Update { key, value } => {
        self.set.update(key, value.clone());
        Metrics::bump(&metrics.updates);
      }
      Claim::Hit { key, reply } => match self.set.move_to_head(key) {
        Some(value) => {
          Metrics::bump(&metrics.hits);
          answer = Some((reply, Lookup::Found { set: set_index, value }));
        }
        None => {
          Metrics::bump(&metrics.misses);
          answer = Some((reply, Lookup::NotFound));
        }
      },
      Claim::Miss { reply } => {
        Metrics::bump(&metrics.misses);
        answer = Some((reply, Lookup::NotFound));
      }
      Claim::Flush { done } => flushed = Some(done),
      Claim::NotMine => return,
    }

    self.shared.publish_set_len(set_index, self.set.len());
    Metrics::bump(&metrics.jobs_committed);
    self.shared.queue.pop();
    trace!(set = set_index, kind = job.kind(), "committed");

    // The caller may have given up waiting; nothing to do then.
    if let Some((reply, lookup)) = answer {
      let _ = reply.try_send(lookup);
    }
    if let Some(done) = flushed {
      let _ = done.try_send(());
    }
    drop(key_index);
  }
}

/// Shuts the whole cache down if a worker unwinds, so its peers are not left
/// waiting at the rendezvous and pending `get`s see a disconnect.
struct PanicGuard<K, V: Send + Sync> {
  set: usize,
  shared: Arc<CacheShared<K, V>>,
}

impl<K, V: Send + Sync> Drop for PanicGuard<K, V> {
  fn drop(&mut self) {
    if thread::panicking() {
      error!(set = self.set, "set worker panicked, shutting the cache down");
      self.shared.shutdown();
    }
  }
}
