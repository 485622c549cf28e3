//! Battery cell balancing across fixed-size packs.
//!
//! Cells with measured impedances are grouped into packs; a pack's
//! quality is its impedance spread, `(max - min) / mean`. The balancer
//! repeatedly exchanges single cells between packs, keeping only
//! exchanges that lower either the average spread or the worst spread.
//!
//! - [`model`]: `Cell`, `Pack`, `Inventory` and the shared, lock-guarded
//!   inventory handle.
//! - [`ingest`]: dealing readings (directly or from CSV) into packs.
//! - [`balance`]: the trial loop, its two strategies, the synchronous
//!   runner and the restartable background engine.
//! - [`report`]: ranked tables and CSV export.
//!
//! # Example
//!
//! ```
//! use u_cellpack::balance::{BalanceConfig, BalanceRunner, Strategy};
//! use u_cellpack::ingest::{read_csv, IngestConfig};
//! use u_cellpack::report;
//!
//! let data = "cell_id,cell_value\n\
//!             A1,0.00210\nA2,0.00250\nA3,0.00212\nA4,0.00248\n\
//!             B1,0.00230\nB2,0.00231\nB3,0.00229\nB4,0.00232\n";
//! let mut inventory = read_csv(data.as_bytes(), &IngestConfig::default().with_cells_per_pack(4)).unwrap();
//!
//! let config = BalanceConfig::default()
//!     .with_strategy(Strategy::WorstFirst)
//!     .with_convergence_threshold(1_000)
//!     .with_seed(7);
//! let before = inventory.max_spread();
//! BalanceRunner::run(&mut inventory, &config).unwrap();
//! assert!(inventory.max_spread() <= before);
//!
//! for row in report::rank(inventory.packs()) {
//!     println!("{} {}", row.id, report::format_spread(row.spread));
//! }
//! ```
//!
//! # Architecture
//!
//! Built in the same shape as the U-Engine algorithm crates: a config
//! builder, a runner and a result struct per algorithm, seeded `rand`
//! generators, and optional `serde`/`parallel` features.

pub mod balance;
pub mod error;
pub mod ingest;
pub mod model;
pub mod random;
pub mod report;

pub use error::{Error, Result};
