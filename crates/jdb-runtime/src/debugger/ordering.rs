//! Cross-lane session ordering
//!
//! One [`SessionGate`] is shared by every lane (or replica) of a parallel
//! execution unit. With the `ordered` flag set, a lane's n-th breakpoint
//! hit may only open its session once every lower-indexed lane has
//! completed its own n-th session: index-ascending order per program
//! point. The SPMD assumption this leans on: all lanes execute the same
//! breakpoints the same number of times.

use std::sync::{Condvar, Mutex};

/// Round/turn gate over a fixed lane count.
#[derive(Debug)]
pub struct SessionGate {
    lanes: usize,
    state: Mutex<GateState>,
    cv: Condvar,
}

#[derive(Debug, Default)]
struct GateState {
    /// Program point currently being served (n-th hit per lane).
    round: usize,
    /// Lane whose session may run at this round.
    turn: usize,
}

impl SessionGate {
    pub fn new(lanes: usize) -> Self {
        Self {
            lanes: lanes.max(1),
            state: Mutex::new(GateState::default()),
            cv: Condvar::new(),
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Block until it is `lane`'s turn for its `hit`-th session.
    ///
    /// The returned guard releases the turn on drop; dropping after the
    /// last lane of a round advances to the next round.
    pub fn enter(&self, lane: usize, hit: usize) -> GateGuard<'_> {
        let mut state = self.state.lock().unwrap();
        while !(state.round == hit && state.turn == lane) {
            state = self.cv.wait(state).unwrap();
        }
        drop(state);
        GateGuard { gate: self }
    }
}

/// Holds one lane's turn; advances the gate when dropped.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a SessionGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock().unwrap();
        state.turn += 1;
        if state.turn == self.gate.lanes {
            state.turn = 0;
            state.round += 1;
        }
        drop(state);
        self.gate.cv.notify_all();
    }
}
