//! Cell balancing by randomized local search.
//!
//! Each trial exchanges one cell between two packs and keeps the exchange
//! only if the objective strictly improves; otherwise both packs are
//! restored. The run stops itself once the number of consecutive
//! non-improving trials exceeds a threshold.
//!
//! Two [`Strategy`]s choose the packs and the objective:
//!
//! - [`Strategy::RandomPair`]: two random packs, minimize the average spread.
//! - [`Strategy::WorstFirst`]: the worst pack and a random partner,
//!   minimize the maximum spread.
//!
//! This is greedy hill climbing, not a global optimizer: there is no
//! temperature schedule and no restarts within a run (see
//! [`BalanceRunner::run_multi_start`] for independent restarts).
//!
//! [`BalanceRunner`] runs on the calling thread; [`Balancer`] runs in the
//! background and can be inspected and stopped while it works.

mod config;
mod engine;
mod observer;
mod runner;
mod state;
mod trial;

pub use config::{BalanceConfig, Strategy, DEFAULT_CONVERGENCE_THRESHOLD};
pub use engine::Balancer;
pub use observer::{
    BalanceEvent, BalanceObserver, ChannelObserver, EventReceiver, NoopObserver, Progress,
    TrialOutcome,
};
pub use runner::{BalanceResult, BalanceRunner};
pub use state::{EngineState, StopHandle};
