//! Building an inventory from cell readings.
//!
//! Readings are `(address, impedance)` pairs, either supplied directly as
//! [`Cell`](crate::model::Cell)s or read from CSV. They are dealt into
//! packs of a fixed size; the count must divide evenly.

mod assemble;
mod config;
mod reader;

pub use assemble::build_inventory;
pub use config::{AssemblyOrder, IngestConfig, DEFAULT_CELLS_PER_PACK};
pub use reader::{read_csv, read_csv_path};
