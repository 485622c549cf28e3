//! Cell, pack and inventory model.
//!
//! A [`Pack`] is an ordered group of [`Cell`]s whose quality is measured
//! by its impedance spread, `(max - min) / mean`. An [`Inventory`] is the
//! set of packs being balanced; [`SharedInventory`] puts it behind the
//! single lock that the background engine and its callers share.

mod cell;
mod inventory;
mod pack;
mod shared;

pub use cell::Cell;
pub use inventory::{Inventory, InventoryStats};
pub(crate) use inventory::rank_by_spread;
pub use pack::Pack;
pub use shared::SharedInventory;
