//! Ranked pack reports and CSV export.
//!
//! Impedances are stored in ohms and displayed in milliohms; spreads are
//! displayed as percentages, both with two decimals.

use crate::error::Result;
use crate::model::{rank_by_spread, Cell, Pack};
use std::io;

/// One row of a ranked report.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedPack {
    /// 1-based position, lowest spread first.
    pub rank: usize,
    pub id: String,
    pub cells: Vec<Cell>,
    /// Spread as a fraction (0.05 = 5%).
    pub spread: f64,
}

/// Ranks packs by ascending spread, in the same order as
/// [`Inventory::sorted_by_spread`](crate::model::Inventory::sorted_by_spread).
/// Equal spreads keep their input order.
pub fn rank(packs: &[Pack]) -> Vec<RankedPack> {
    rank_by_spread(packs)
        .into_iter()
        .enumerate()
        .map(|(i, (spread, p))| RankedPack {
            rank: i + 1,
            id: p.id().to_string(),
            cells: p.cells().to_vec(),
            spread,
        })
        .collect()
}

/// `A-01 (2.31 mΩ)`
pub fn format_cell(cell: &Cell) -> String {
    format!("{} ({:.2} mΩ)", cell.address(), cell.impedance() * 1000.0)
}

/// `4.27%`
pub fn format_spread(spread: f64) -> String {
    format!("{:.2}%", spread * 100.0)
}

/// Writes a ranked report as CSV: `Pack`, `Cell 1` .. `Cell n`, `Spread`.
///
/// `n` is the largest pack size in `rows`; shorter packs get empty cells.
pub fn write_csv<W: io::Write>(writer: W, rows: &[RankedPack]) -> Result<()> {
    let width = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(width + 2);
    header.push("Pack".to_string());
    header.extend((1..=width).map(|i| format!("Cell {i}")));
    header.push("Spread".to_string());
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(width + 2);
        record.push(row.id.clone());
        record.extend(row.cells.iter().map(format_cell));
        record.resize(width + 1, String::new());
        record.push(format_spread(row.spread));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
