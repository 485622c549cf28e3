//! The trial loop and its synchronous entry points.

use super::config::BalanceConfig;
use super::observer::{BalanceObserver, NoopObserver, Progress, TrialOutcome};
use super::state::{AtomicState, EngineState};
use super::trial::run_trial;
use crate::error::{Error, Result};
use crate::model::{Inventory, SharedInventory};
use crate::random::rng_from;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a balancing run.
#[derive(Debug, Clone, Default)]
pub struct BalanceResult {
    /// Trials executed, including failed ones.
    pub trials: usize,

    /// Trials whose exchange was kept.
    pub accepted: usize,

    /// Trials abandoned because of an internal inconsistency.
    pub failed_trials: usize,

    /// Whether the run stopped itself after too many non-improving trials.
    pub converged: bool,

    /// Whether the run was stopped or cancelled externally.
    pub cancelled: bool,

    /// Whether the run hit `max_duration`.
    pub timed_out: bool,

    /// Objective before the first trial.
    pub initial_objective: f64,

    /// Objective after the last trial.
    pub final_objective: f64,

    /// Objective after each accepted trial, starting with the initial
    /// value. Non-increasing.
    pub objective_history: Vec<f64>,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Executes balancing runs on the calling thread.
///
/// For a background run that can be inspected and stopped while it
/// works, use [`Balancer`](super::Balancer).
pub struct BalanceRunner;

impl BalanceRunner {
    /// Balances `inventory` in place until convergence or budget.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if `config` is invalid.
    /// - [`Error::InsufficientPacks`] if there are fewer than two packs.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_cellpack::balance::{BalanceConfig, BalanceRunner};
    /// use u_cellpack::ingest::{build_inventory, IngestConfig};
    /// use u_cellpack::model::Cell;
    ///
    /// let cells = (0..24).map(|i| Cell::new(format!("c{i}"), 1.0 + (i % 7) as f64 * 0.05));
    /// let mut inventory = build_inventory(cells, &IngestConfig::default().with_cells_per_pack(6)).unwrap();
    /// let before = inventory.average_spread();
    ///
    /// let config = BalanceConfig::default().with_convergence_threshold(500).with_seed(42);
    /// let result = BalanceRunner::run(&mut inventory, &config).unwrap();
    ///
    /// assert!(result.converged);
    /// assert!(inventory.average_spread() <= before);
    /// ```
    pub fn run(inventory: &mut Inventory, config: &BalanceConfig) -> Result<BalanceResult> {
        Self::run_with_cancel(inventory, config, None, &mut NoopObserver)
    }

    /// Runs with an optional cancellation token and an observer.
    ///
    /// If `cancel` is set to `true`, the run stops before its next trial.
    pub fn run_with_cancel<O: BalanceObserver>(
        inventory: &mut Inventory,
        config: &BalanceConfig,
        cancel: Option<Arc<AtomicBool>>,
        observer: &mut O,
    ) -> Result<BalanceResult> {
        config.validate()?;
        check_pack_count(inventory)?;

        let shared = SharedInventory::new(std::mem::take(inventory));
        let state = AtomicState::new(EngineState::Running);
        let result = drive(&shared, config, &state, cancel.as_deref(), observer);
        *inventory = shared.take();
        Ok(result)
    }

    /// Runs `starts` independent restarts from copies of `inventory`,
    /// each with its own generator, and returns the best outcome.
    ///
    /// With the `parallel` feature the restarts run on the rayon pool.
    /// Seeds are derived from `config.seed`, so a seeded call is
    /// reproducible either way. Ties go to the earliest restart.
    pub fn run_multi_start(
        inventory: &Inventory,
        config: &BalanceConfig,
        starts: usize,
    ) -> Result<(Inventory, BalanceResult)> {
        use rand::Rng;

        config.validate()?;
        check_pack_count(inventory)?;
        if starts == 0 {
            return Err(Error::Configuration("starts must be positive".into()));
        }

        let mut master = rng_from(config.seed);
        let seeds: Vec<u64> = (0..starts).map(|_| master.random()).collect();

        let one = |seed: u64| -> Result<(Inventory, BalanceResult)> {
            let mut inv = inventory.clone();
            let cfg = config.clone().with_seed(seed);
            let result = Self::run(&mut inv, &cfg)?;
            Ok((inv, result))
        };

        #[cfg(feature = "parallel")]
        let runs: Vec<(Inventory, BalanceResult)> = {
            use rayon::prelude::*;
            seeds.into_par_iter().map(one).collect::<Result<_>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let runs: Vec<(Inventory, BalanceResult)> =
            seeds.into_iter().map(one).collect::<Result<_>>()?;

        runs.into_iter()
            .reduce(|best, next| {
                if next.1.final_objective < best.1.final_objective {
                    next
                } else {
                    best
                }
            })
            .ok_or_else(|| Error::Configuration("starts must be positive".into()))
    }
}

pub(crate) fn check_pack_count(inventory: &Inventory) -> Result<()> {
    if inventory.len() < 2 {
        return Err(Error::InsufficientPacks {
            found: inventory.len(),
        });
    }
    Ok(())
}

/// The trial loop shared by the synchronous runner and the background
/// engine. Runs while `state` is `Running`.
///
/// The inventory lock is held for exactly one trial (plus the snapshot
/// for its progress report) and released before the observer is called.
pub(crate) fn drive<O: BalanceObserver + ?Sized>(
    shared: &SharedInventory,
    config: &BalanceConfig,
    state: &AtomicState,
    cancel: Option<&AtomicBool>,
    observer: &mut O,
) -> BalanceResult {
    let started = Instant::now();
    let mut rng = rng_from(config.seed);
    let strategy = config.strategy;

    let initial = shared.with(|inv| strategy.objective(inv));
    let mut result = BalanceResult {
        initial_objective: initial,
        final_objective: initial,
        objective_history: vec![initial],
        ..BalanceResult::default()
    };
    let mut stale = 0usize;

    tracing::debug!(
        strategy = strategy.name(),
        threshold = config.convergence_threshold,
        initial_objective = initial,
        "balancing started"
    );

    while state.load() == EngineState::Running {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            result.cancelled = true;
            break;
        }
        if config
            .max_duration
            .is_some_and(|limit| started.elapsed() >= limit)
        {
            result.timed_out = true;
            break;
        }
        if config.max_trials > 0 && result.trials >= config.max_trials {
            break;
        }

        result.trials += 1;
        let notify = result.trials % config.progress_interval == 0;

        let (report, snapshot) = {
            let mut inv = shared.lock();
            let report = run_trial(&mut inv, strategy, &mut rng);
            let snapshot = notify.then(|| {
                let packs = if observer.wants_snapshot() {
                    inv.snapshot()
                } else {
                    Vec::new()
                };
                (inv.stats(), packs)
            });
            (report, snapshot)
        };

        let (outcome, baseline, objective) = match report {
            Ok(r) => (r.outcome, r.baseline, r.objective),
            Err(e) => {
                tracing::warn!(trial = result.trials, error = %e, "trial abandoned");
                (TrialOutcome::Failed, result.final_objective, result.final_objective)
            }
        };

        match outcome {
            TrialOutcome::Accepted => {
                stale = 0;
                result.accepted += 1;
                result.objective_history.push(objective);
                tracing::trace!(trial = result.trials, objective, "exchange accepted");
            }
            TrialOutcome::Rejected => stale += 1,
            TrialOutcome::Failed => {
                result.failed_trials += 1;
                stale += 1;
            }
        }
        result.final_objective = objective;

        let converged = stale > config.convergence_threshold
            && state.transition(EngineState::Running, EngineState::Converged);

        let snapshot = match snapshot {
            Some(s) => Some(s),
            None if converged => Some(shared.with(|inv| {
                let packs = if observer.wants_snapshot() {
                    inv.snapshot()
                } else {
                    Vec::new()
                };
                (inv.stats(), packs)
            })),
            None => None,
        };
        if let Some((stats, packs)) = snapshot {
            observer.on_progress(&Progress {
                trial: result.trials,
                outcome,
                baseline,
                objective,
                stale_trials: stale,
                stats,
                packs,
            });
        }

        if converged {
            result.converged = true;
            result.elapsed = started.elapsed();
            tracing::info!(
                trials = result.trials,
                accepted = result.accepted,
                objective = result.final_objective,
                "balancing converged"
            );
            observer.on_converged(&result);
            break;
        }
    }

    if !result.converged && state.load() == EngineState::Idle {
        result.cancelled = true;
    }
    result.elapsed = started.elapsed();

    tracing::debug!(
        trials = result.trials,
        accepted = result.accepted,
        failed = result.failed_trials,
        converged = result.converged,
        cancelled = result.cancelled,
        "balancing finished"
    );
    result
}
