use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct RoundState {
  arrived: usize,
  generation: u64,
  closed: bool,
}

/// A reusable barrier for the set workers.
///
/// Unlike `std::sync::Barrier` it can be closed, which releases every
/// current and future waiter so workers can exit when the cache is dropped.
#[derive(Debug)]
pub(crate) struct Rendezvous {
  parties: usize,
  state: Mutex<RoundState>,
  released: Condvar,
}

impl Rendezvous {
  pub(crate) fn new(parties: usize) -> Self {
    debug_assert!(parties > 0);
    Self {
      parties,
      state: Mutex::new(RoundState {
        arrived: 0,
        generation: 0,
        closed: false,
      }),
      released: Condvar::new(),
    }
  }

  /// Blocks until all parties have arrived for the current round.
  ///
  /// Returns `true` when the round completed, `false` if the rendezvous was
  /// closed first.
  pub(crate) fn wait(&self) -> bool {
    let mut state = self.state.lock();
    if state.closed {
      return false;
    }

    let generation = state.generation;
    state.arrived += 1;
    if state.arrived == self.parties {
      state.arrived = 0;
      state.generation = generation.wrapping_add(1);
      self.released.notify_all();
      return true;
    }

    while state.generation == generation && !state.closed {
      self.released.wait(&mut state);
    }
    state.generation != generation
  }

  pub(crate) fn close(&self) {
    let mut state = self.state.lock();
    state.closed = true;
    self.released.notify_all();
  }
}
