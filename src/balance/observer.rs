//! Progress reporting from the trial loop.
//!
//! Observers are called on the worker thread after the inventory lock has
//! been released. They are advisory: anything slow should be handed off
//! (see [`ChannelObserver`]) rather than done inline.

use super::runner::BalanceResult;
use crate::model::{InventoryStats, Pack};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// What happened in a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// The exchange lowered the objective and was kept.
    Accepted,
    /// The exchange did not lower the objective and was reverted.
    Rejected,
    /// The trial hit an internal inconsistency and was abandoned
    /// without changing the inventory.
    Failed,
}

/// Live state reported after a trial.
#[derive(Debug, Clone)]
pub struct Progress {
    /// 1-based trial number within the run.
    pub trial: usize,
    pub outcome: TrialOutcome,
    /// Objective before the trial.
    pub baseline: f64,
    /// Objective after the trial (after revert, if rejected).
    pub objective: f64,
    /// Consecutive non-improving trials so far.
    pub stale_trials: usize,
    pub stats: InventoryStats,
    /// Copy of the pack list, taken under the same lock as the trial.
    /// Empty when the observer declines snapshots.
    pub packs: Vec<Pack>,
}

/// Receives progress and convergence notifications from a run.
pub trait BalanceObserver: Send {
    /// Called after trials, at the configured progress interval.
    fn on_progress(&mut self, progress: &Progress);

    /// Called once when the run converges. Not called when the run is
    /// stopped, cancelled, or runs out of budget.
    fn on_converged(&mut self, _result: &BalanceResult) {}

    /// Whether [`Progress::packs`] should be filled in.
    fn wants_snapshot(&self) -> bool {
        true
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BalanceObserver for NoopObserver {
    fn on_progress(&mut self, _progress: &Progress) {}

    fn wants_snapshot(&self) -> bool {
        false
    }
}

impl<F> BalanceObserver for F
where
    F: FnMut(&Progress) + Send,
{
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Event delivered through a [`ChannelObserver`].
#[derive(Debug, Clone)]
pub enum BalanceEvent {
    Progress(Progress),
    Converged(BalanceResult),
}

/// Observer that forwards events to another thread without ever blocking
/// the trial loop.
///
/// At most `capacity` progress events are queued; further ones are
/// dropped until the receiver catches up. The convergence event is never
/// dropped.
///
/// # Examples
///
/// ```
/// use u_cellpack::balance::ChannelObserver;
///
/// let (observer, events) = ChannelObserver::bounded(64);
/// assert!(events.try_recv().is_none());
/// # drop(observer);
/// ```
#[derive(Debug)]
pub struct ChannelObserver {
    tx: Sender<BalanceEvent>,
    pending: Arc<AtomicUsize>,
    capacity: usize,
    dropped: usize,
}

impl ChannelObserver {
    /// Creates an observer and the receiving end of its queue.
    ///
    /// A `capacity` of zero is treated as one: the queue always has room
    /// for the latest progress event once the receiver has drained it.
    pub fn bounded(capacity: usize) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let observer = Self {
            tx,
            pending: pending.clone(),
            capacity: capacity.max(1),
            dropped: 0,
        };
        (observer, EventReceiver { rx, pending })
    }

    /// Progress events dropped because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn send(&self, event: BalanceEvent) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(event).is_err() {
            // Receiver gone; nothing will ever drain the counter.
            self.pending.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl BalanceObserver for ChannelObserver {
    fn on_progress(&mut self, progress: &Progress) {
        if self.pending.load(Ordering::Acquire) >= self.capacity {
            self.dropped += 1;
            return;
        }
        self.send(BalanceEvent::Progress(progress.clone()));
    }

    fn on_converged(&mut self, result: &BalanceResult) {
        self.send(BalanceEvent::Converged(result.clone()));
    }
}

/// Receiving end of a [`ChannelObserver`].
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<BalanceEvent>,
    pending: Arc<AtomicUsize>,
}

impl EventReceiver {
    /// Blocks until an event arrives. Returns `None` once the observer
    /// has been dropped and the queue is empty.
    pub fn recv(&self) -> Option<BalanceEvent> {
        let event = self.rx.recv().ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(event)
    }

    /// Returns an event if one is queued.
    pub fn try_recv(&self) -> Option<BalanceEvent> {
        match self.rx.try_recv() {
            Ok(event) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Some(event)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for an event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BalanceEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
