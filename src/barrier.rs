//! Reusable rendezvous for a fixed team of threads.
//!
//! Every cycle has two halves. Arrival: participants bump the arrival count
//! and sleep until the last one shows up. Departure: the last arriver resets
//! the arrival count, opens the gate, and then waits until every other
//! participant has walked out before it returns itself. A participant that
//! loops around quickly and calls [`Barrier::wait`] again while stragglers are
//! still leaving is held at the entrance, so the arrival count of cycle K+1
//! can never be mixed up with the exits of cycle K.
//!
//! Calling `wait` from fewer threads than the team size blocks forever. That
//! is the intended failure mode for a miscounted team.

use parking_lot::{Condvar, Mutex};
use tracing::trace;

#[derive(Debug)]
struct State {
    team: usize,
    arrived: usize,
    departing: usize,
    generation: u64,
}

#[derive(Debug)]
pub struct Barrier {
    state: Mutex<State>,
    cvar: Condvar,
}

/// Outcome of a [`Barrier::wait`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: u64,
}

impl BarrierWaitResult {
    /// True for exactly one participant per cycle: the last one to arrive.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Number of cycles completed by the barrier, including this one.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Barrier {
    /// Creates a barrier for exactly `team` participants.
    ///
    /// # Panics
    ///
    /// Panics if `team` is zero.
    pub fn new(team: usize) -> Self {
        assert!(team > 0, "barrier team size must be at least one");
        Self {
            state: Mutex::new(State {
                team,
                arrived: 0,
                departing: 0,
                generation: 0,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Reconfigures the team size and clears all counters. Taking `&mut self`
    /// guarantees no thread is inside `wait` at the same time.
    pub fn reinitialize(&mut self, team: usize) {
        assert!(team > 0, "barrier team size must be at least one");
        let state = self.state.get_mut();
        state.team = team;
        state.arrived = 0;
        state.departing = 0;
        state.generation = 0;
    }

    pub fn team_size(&self) -> usize {
        self.state.lock().team
    }

    /// Completed cycles so far.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Blocks until all participants of the current cycle have arrived.
    pub fn wait(&self) -> BarrierWaitResult {
        let mut state = self.state.lock();

        // previous cycle still draining
        while state.departing > 0 {
            self.cvar.wait(&mut state);
        }

        state.arrived += 1;
        if state.arrived == state.team {
            state.arrived = 0;
            state.departing = state.team - 1;
            state.generation += 1;
            let generation = state.generation;
            trace!(generation, team = state.team, "barrier released");
            self.cvar.notify_all();

            while state.departing > 0 {
                self.cvar.wait(&mut state);
            }
            // wake anyone parked at the entrance
            self.cvar.notify_all();
            return BarrierWaitResult {
                leader: true,
                generation,
            };
        }

        let generation = state.generation;
        while state.generation == generation {
            self.cvar.wait(&mut state);
        }
        let completed = state.generation;
        state.departing -= 1;
        if state.departing == 0 {
            self.cvar.notify_all();
        }
        BarrierWaitResult {
            leader: false,
            generation: completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_single_participant_never_blocks() {
        let barrier = Barrier::new(1);
        for expected in 1..=5 {
            let result = barrier.wait();
            assert!(result.is_leader());
            assert_eq!(result.generation(), expected);
        }
    }

    #[test]
    fn test_exactly_one_leader_per_cycle() {
        const TEAM: usize = 4;
        const CYCLES: usize = 50;
        let barrier = Arc::new(Barrier::new(TEAM));
        let leaders = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..TEAM)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let leaders = Arc::clone(&leaders);
                thread::spawn(move || {
                    for _ in 0..CYCLES {
                        if barrier.wait().is_leader() {
                            leaders.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(leaders.load(Ordering::SeqCst), CYCLES);
        assert_eq!(barrier.generation(), CYCLES as u64);
    }

    #[test]
    fn test_reinitialize_resets_counters() {
        let mut barrier = Barrier::new(1);
        barrier.wait();
        barrier.wait();
        barrier.reinitialize(2);
        assert_eq!(barrier.team_size(), 2);
        assert_eq!(barrier.generation(), 0);
    }

    #[test]
    fn test_short_team_blocks() {
        let barrier = Arc::new(Barrier::new(3));
        let (tx, rx) = mpsc::channel();
        for _ in 0..2 {
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            thread::spawn(move || {
                barrier.wait();
                let _ = tx.send(());
            });
        }
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(barrier.generation(), 0);
    }
}
