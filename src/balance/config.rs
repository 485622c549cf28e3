//! Balancing configuration and pack-selection strategies.

use crate::error::{Error, Result};
use crate::model::Inventory;
use std::time::Duration;

/// Consecutive non-improving trials after which a run is considered
/// converged. Empirical: large enough that further gains are unlikely,
/// not a proof of optimality.
pub const DEFAULT_CONVERGENCE_THRESHOLD: usize = 10_000;

/// Pack-selection heuristic, which also fixes the objective being
/// minimized.
///
/// # Examples
///
/// ```
/// use u_cellpack::balance::Strategy;
///
/// // Balance the whole population on average.
/// let s = Strategy::RandomPair;
///
/// // Drive down the single worst pack.
/// let s = Strategy::WorstFirst;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Two distinct packs chosen uniformly at random; minimizes the
    /// average spread across all packs.
    #[default]
    RandomPair,

    /// The worst pack paired with a random other pack; minimizes the
    /// maximum spread. Use when the constraint is "no pack above X".
    WorstFirst,
}

impl Strategy {
    /// The objective this strategy minimizes, evaluated on `inventory`.
    pub fn objective(self, inventory: &Inventory) -> f64 {
        match self {
            Strategy::RandomPair => inventory.average_spread(),
            Strategy::WorstFirst => inventory.max_spread(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::RandomPair => "random-pair",
            Strategy::WorstFirst => "worst-first",
        }
    }
}

/// Configuration for a balancing run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_cellpack::balance::{BalanceConfig, Strategy};
///
/// let config = BalanceConfig::default()
///     .with_strategy(Strategy::WorstFirst)
///     .with_convergence_threshold(5_000)
///     .with_max_duration(Duration::from_secs(30))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    /// Pack-selection heuristic and objective.
    pub strategy: Strategy,

    /// The run converges once the number of consecutive non-improving
    /// trials exceeds this value. Must be positive.
    pub convergence_threshold: usize,

    /// Hard budget on total trials. 0 = no limit.
    pub max_trials: usize,

    /// Wall-clock deadline, checked before each trial.
    pub max_duration: Option<Duration>,

    /// Notify the observer every `progress_interval` trials. The trial
    /// that converges is always reported. Must be positive.
    pub progress_interval: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_trials: 0,
            max_duration: None,
            progress_interval: 1,
            seed: None,
        }
    }
}

impl BalanceConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_convergence_threshold(mut self, n: usize) -> Self {
        self.convergence_threshold = n;
        self
    }

    pub fn with_max_trials(mut self, n: usize) -> Self {
        self.max_trials = n;
        self
    }

    pub fn with_max_duration(mut self, d: Duration) -> Self {
        self.max_duration = Some(d);
        self
    }

    pub fn with_progress_interval(mut self, n: usize) -> Self {
        self.progress_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.convergence_threshold == 0 {
            return Err(Error::Configuration(
                "convergence_threshold must be positive".into(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(Error::Configuration(
                "progress_interval must be positive".into(),
            ));
        }
        Ok(())
    }
}
