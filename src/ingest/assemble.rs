//! Partitioning a flat list of cells into packs.

use super::config::{AssemblyOrder, IngestConfig};
use crate::error::{Error, Result};
use crate::model::{Cell, Inventory, Pack};

/// Groups cells into packs of `config.cells_per_pack`.
///
/// Packs are numbered `"0"`, `"1"`, ... in creation order. See
/// [`AssemblyOrder`] for which cells land in which pack.
///
/// # Errors
///
/// - [`Error::Configuration`] if `cells_per_pack` is zero.
/// - [`Error::MalformedRecord`] if an impedance is negative or not
///   finite. `row` is the 1-based position of the cell in `cells`.
/// - [`Error::InvalidPartition`] if the cell count is not a multiple of
///   `cells_per_pack`. Nothing is assembled in that case.
///
/// # Examples
///
/// ```
/// use u_cellpack::ingest::{build_inventory, IngestConfig};
/// use u_cellpack::model::Cell;
///
/// let cells = (0..12).map(|i| Cell::new(format!("c{i}"), 1.0 + i as f64 * 0.01));
/// let inventory = build_inventory(cells, &IngestConfig::default().with_cells_per_pack(4)).unwrap();
/// assert_eq!(inventory.len(), 3);
/// ```
pub fn build_inventory(
    cells: impl IntoIterator<Item = Cell>,
    config: &IngestConfig,
) -> Result<Inventory> {
    config.validate()?;
    let per_pack = config.cells_per_pack;

    let mut cells: Vec<Cell> = cells.into_iter().collect();
    if let Some(i) = cells.iter().position(|c| !is_valid_impedance(c.impedance())) {
        return Err(Error::MalformedRecord {
            row: i + 1,
            reason: format!("impedance of {} must be finite and non-negative", cells[i]),
        });
    }
    if cells.len() % per_pack != 0 {
        return Err(Error::InvalidPartition {
            cells: cells.len(),
            cells_per_pack: per_pack,
        });
    }
    if config.order == AssemblyOrder::Reversed {
        cells.reverse();
    }

    let pack_count = cells.len() / per_pack;
    let mut remaining = cells.into_iter();
    let packs = (0..pack_count)
        .map(|i| Pack::with_cells(i.to_string(), remaining.by_ref().take(per_pack).collect()))
        .collect();

    tracing::debug!(packs = pack_count, cells_per_pack = per_pack, "assembled inventory");
    Ok(Inventory::new(packs))
}

fn is_valid_impedance(z: f64) -> bool {
    z.is_finite() && z >= 0.0
}
