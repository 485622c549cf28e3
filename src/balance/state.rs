//! Engine lifecycle state.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a balancing engine.
///
/// ```text
/// Idle ──start──▶ Running ──stop──▶ Idle
///                    │
///                    └──convergence──▶ Converged ──start──▶ Running
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not running: never started, stopped, or out of budget.
    Idle,
    /// A worker is executing trials.
    Running,
    /// The last run stopped itself after too many non-improving trials.
    Converged,
}

impl EngineState {
    fn to_u8(self) -> u8 {
        match self {
            EngineState::Idle => 0,
            EngineState::Running => 1,
            EngineState::Converged => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => EngineState::Running,
            2 => EngineState::Converged,
            _ => EngineState::Idle,
        }
    }
}

/// [`EngineState`] stored in an atomic so the worker and callers can
/// observe and change it without locking the inventory.
#[derive(Debug)]
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub(crate) fn new(state: EngineState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    pub(crate) fn load(&self) -> EngineState {
        EngineState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: EngineState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }

    /// Moves `from → to`; returns `false` if the state was not `from`.
    pub(crate) fn transition(&self, from: EngineState, to: EngineState) -> bool {
        self.0
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Clonable handle that can stop a running engine from any thread.
///
/// Stopping is cooperative: the worker notices at the top of its next
/// trial, so a trial already in progress still completes.
#[derive(Debug, Clone)]
pub struct StopHandle {
    pub(crate) state: Arc<AtomicState>,
}

impl StopHandle {
    /// Requests a stop. Returns `true` if this call moved the engine from
    /// `Running` to `Idle`; repeated or late calls return `false`.
    pub fn stop(&self) -> bool {
        self.state
            .transition(EngineState::Running, EngineState::Idle)
    }

    pub fn state(&self) -> EngineState {
        self.state.load()
    }
}
