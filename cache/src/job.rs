use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use fibre::mpsc;
use parking_lot::{Condvar, Mutex};

/// The answer a worker publishes for a `get`.
#[derive(Debug)]
pub(crate) enum Lookup<V> {
  Found { set: usize, value: Arc<V> },
  NotFound,
}

/// A queued request. Jobs are shared as `Arc<Job>` and compared by pointer
/// identity, never by value.
pub(crate) enum Job<K, V: Send + Sync> {
  Put {
    key: K,
    value: Arc<V>,
  },
  Get {
    key: K,
    reply: mpsc::BoundedSender<Lookup<V>>,
  },
  /// Completes once every job enqueued before it has been committed.
  Flush { done: mpsc::BoundedSender<()> },
}

impl<K, V: Send + Sync> Job<K, V> {
  pub(crate) fn key(&self) -> Option<&K> {
    match self {
      Job::Put { key, .. } | Job::Get { key, .. } => Some(key),
      Job::Flush { .. } => None,
    }
  }

  pub(crate) fn kind(&self) -> &'static str {
    match self {
      Job::Put { .. } => "put",
      Job::Get { .. } => "get",
      Job::Flush { .. } => "flush",
    }
  }
}

impl<K: fmt::Debug, V: Send + Sync> fmt::Debug for Job<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.key() {
      Some(key) => write!(f, "{}({:?})", self.kind(), key),
      None => write!(f, "{}", self.kind()),
    }
  }
}

struct QueueState<K, V: Send + Sync> {
  jobs: VecDeque<Arc<Job<K, V>>>,
  closed: bool,
}

/// A FIFO of pending jobs shared by every worker.
///
/// Every append wakes all sleeping workers, even ones that are already
/// awake; a worker only sleeps after it has seen the queue empty while
/// holding the queue lock, so no wakeup is lost.
pub(crate) struct JobQueue<K, V: Send + Sync> {
  state: Mutex<QueueState<K, V>>,
  work_ready: Condvar,
}

impl<K, V: Send + Sync> JobQueue<K, V> {
  pub(crate) fn new() -> Self {
    Self {
      state: Mutex::new(QueueState {
        jobs: VecDeque::new(),
        closed: false,
      }),
      work_ready: Condvar::new(),
    }
  }

  /// Adds a job to the tail and wakes every worker.
  ///
  /// Returns `false` and drops the job if the queue has been closed.
  pub(crate) fn append(&self, job: Job<K, V>) -> bool {
    let mut state = self.state.lock();
    if state.closed {
      return false;
    }
    state.jobs.push_back(Arc::new(job));
    self.work_ready.notify_all();
    true
  }

  pub(crate) fn peek(&self) -> Option<Arc<Job<K, V>>> {
    self.state.lock().jobs.front().cloned()
  }

  pub(crate) fn pop(&self) -> Option<Arc<Job<K, V>>> {
    self.state.lock().jobs.pop_front()
  }

  /// Whether `job` is, by identity, still the head of the queue.
  pub(crate) fn is_head(&self, job: &Arc<Job<K, V>>) -> bool {
    self
      .state
      .lock()
      .jobs
      .front()
      .is_some_and(|head| Arc::ptr_eq(head, job))
  }

  /// Suspends the caller once if the queue is empty.
  ///
  /// A wakeup does not guarantee that a job is waiting: another worker may
  /// already have taken it. Returns `false` once the queue is closed.
  pub(crate) fn wait_for_work(&self) -> bool {
    let mut state = self.state.lock();
    if state.closed {
      return false;
    }
    if state.jobs.is_empty() {
      self.work_ready.wait(&mut state);
    }
    !state.closed
  }

  /// Closes the queue, dropping every pending job and waking all workers.
  pub(crate) fn close(&self) {
    let mut state = self.state.lock();
    state.closed = true;
    state.jobs.clear();
    self.work_ready.notify_all();
  }

  pub(crate) fn len(&self) -> usize {
    self.state.lock().jobs.len()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::thread;
  use std::time::Duration;

  fn put(key: i32) -> Job<i32, i32> {
    Job::Put {
      key,
      value: Arc::new(key),
    }
  }

  #[test]
  fn jobs_come_out_in_fifo_order() {
    let queue = JobQueue::new();
    assert!(queue.peek().is_none());
    queue.append(put(1));
    queue.append(put(2));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.peek().unwrap().key(), Some(&1));
    assert_eq!(queue.pop().unwrap().key(), Some(&1));
    assert_eq!(queue.pop().unwrap().key(), Some(&2));
    assert!(queue.pop().is_none());
  }

  #[test]
  fn head_identity_is_by_pointer() {
    let queue = JobQueue::new();
    queue.append(put(1));
    queue.append(put(1));
    let first = queue.peek().unwrap();
    assert!(queue.is_head(&first));

    queue.pop();
    let second = queue.peek().unwrap();
    // Same key and value, different job.
    assert!(!queue.is_head(&first));
    assert!(queue.is_head(&second));
  }

  #[test]
  fn append_wakes_a_sleeping_worker() {
    let queue = Arc::new(JobQueue::new());
    let worker_queue = queue.clone();
    let worker = thread::spawn(move || {
      assert!(worker_queue.wait_for_work());
      worker_queue.pop().and_then(|job| job.key().copied())
    });

    thread::sleep(Duration::from_millis(20));
    queue.append(put(9));
    assert_eq!(worker.join().unwrap(), Some(9));
  }

  #[test]
  fn wait_returns_immediately_when_work_is_pending() {
    let queue = JobQueue::new();
    queue.append(put(1));
    assert!(queue.wait_for_work());
  }

  #[test]
  fn close_releases_sleepers_and_rejects_appends() {
    let queue = Arc::new(JobQueue::<i32, i32>::new());
    let sleeper = {
      let queue = queue.clone();
      thread::spawn(move || queue.wait_for_work())
    };

    thread::sleep(Duration::from_millis(20));
    queue.close();
    assert!(!sleeper.join().unwrap());
    assert!(!queue.append(put(1)));
    assert_eq!(queue.len(), 0);
    assert!(!queue.wait_for_work());
  }
}
