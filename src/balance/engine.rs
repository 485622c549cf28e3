//! Background balancing engine.
//!
//! [`Balancer`] runs the trial loop on a dedicated worker thread against
//! a [`SharedInventory`]. Callers keep full access to the inventory while
//! it runs: every read takes the same lock as a trial, so it always sees
//! a whole inventory, never one mid-exchange.

use super::config::BalanceConfig;
use super::observer::{BalanceObserver, NoopObserver};
use super::runner::{check_pack_count, drive, BalanceResult};
use super::state::{AtomicState, EngineState, StopHandle};
use crate::error::{Error, Result};
use crate::model::{InventoryStats, Pack, SharedInventory};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A restartable background balancing engine.
///
/// # Lifecycle
///
/// - [`start`](Self::start) while `Running` fails with
///   [`Error::AlreadyRunning`]. Otherwise it waits for any previous
///   worker to exit and launches a new one with a fresh generator.
/// - [`stop`](Self::stop) is safe from any thread, any number of times.
///   The worker finishes its current trial before exiting.
/// - Dropping the engine stops and joins the worker.
///
/// # Examples
///
/// ```
/// use u_cellpack::balance::{BalanceConfig, Balancer, EngineState};
/// use u_cellpack::ingest::{build_inventory, IngestConfig};
/// use u_cellpack::model::Cell;
///
/// let cells = (0..16).map(|i| Cell::new(format!("c{i}"), 1.0 + (i * 5 % 16) as f64 * 0.01));
/// let inventory = build_inventory(cells, &IngestConfig::default().with_cells_per_pack(4)).unwrap();
///
/// let config = BalanceConfig::default().with_convergence_threshold(200).with_seed(1);
/// let mut balancer = Balancer::new(inventory, config).unwrap();
/// balancer.start().unwrap();
///
/// let result = balancer.wait().unwrap();
/// assert!(result.converged);
/// assert_eq!(balancer.state(), EngineState::Converged);
/// assert_eq!(balancer.stats().cell_count, 16);
/// ```
pub struct Balancer {
    inventory: SharedInventory,
    config: BalanceConfig,
    state: Arc<AtomicState>,
    worker: Option<JoinHandle<BalanceResult>>,
}

impl Balancer {
    /// Creates an idle engine.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if `config` is invalid.
    pub fn new(inventory: impl Into<SharedInventory>, config: BalanceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inventory: inventory.into(),
            config,
            state: Arc::new(AtomicState::new(EngineState::Idle)),
            worker: None,
        })
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Replaces the configuration used by the next [`start`](Self::start).
    pub fn set_config(&mut self, config: BalanceConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Handle to the inventory being balanced.
    pub fn inventory(&self) -> &SharedInventory {
        &self.inventory
    }

    pub fn state(&self) -> EngineState {
        self.state.load()
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// A handle that can stop this engine from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            state: self.state.clone(),
        }
    }

    /// Starts balancing in the background without an observer.
    pub fn start(&mut self) -> Result<()> {
        self.start_with(NoopObserver)
    }

    /// Starts balancing in the background, reporting to `observer`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if a run is in progress.
    /// - [`Error::InsufficientPacks`] if the inventory has fewer than two
    ///   packs. Checked here, before any trial.
    /// - [`Error::Io`] if the worker thread cannot be spawned.
    pub fn start_with<O>(&mut self, observer: O) -> Result<()>
    where
        O: BalanceObserver + 'static,
    {
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }
        // A stopped worker may still be finishing its last trial.
        self.wait();

        self.inventory.with(check_pack_count)?;
        self.state.store(EngineState::Running);

        let inventory = self.inventory.clone();
        let config = self.config.clone();
        let state = self.state.clone();
        let mut observer = observer;

        let spawned = thread::Builder::new()
            .name("cellpack-balancer".into())
            .spawn(move || {
                let result = drive(&inventory, &config, &state, None, &mut observer);
                // Budget or deadline exhausted: nobody else moved the state.
                state.transition(EngineState::Running, EngineState::Idle);
                result
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.state.store(EngineState::Idle);
                Err(e.into())
            }
        }
    }

    /// Requests a stop. Returns `true` if the engine was running.
    ///
    /// Returns immediately; the worker exits after its current trial.
    /// Use [`wait`](Self::wait) to block until it has.
    pub fn stop(&self) -> bool {
        let stopped = self.stop_handle().stop();
        if stopped {
            tracing::debug!("balancer stop requested");
        }
        stopped
    }

    /// Blocks until the current worker exits and returns its result.
    ///
    /// Returns `None` if no worker was started since the last `wait`, or
    /// if the worker panicked. A running engine only exits on stop,
    /// convergence, or its configured budget.
    pub fn wait(&mut self) -> Option<BalanceResult> {
        let handle = self.worker.take()?;
        match handle.join() {
            Ok(result) => Some(result),
            Err(_) => {
                tracing::error!("balancer worker panicked");
                self.state.store(EngineState::Idle);
                None
            }
        }
    }

    /// Copy of the current pack list.
    pub fn snapshot(&self) -> Vec<Pack> {
        self.inventory.snapshot()
    }

    /// Current packs ranked by ascending spread.
    pub fn sorted_by_spread(&self) -> Vec<Pack> {
        self.inventory.sorted_by_spread()
    }

    pub fn stats(&self) -> InventoryStats {
        self.inventory.stats()
    }
}

impl Drop for Balancer {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}
