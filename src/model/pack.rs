//! Battery pack: an ordered group of cells and its spread metric.

use super::cell::Cell;
use crate::error::{Error, Result};
use rand::Rng;
use std::cmp::Ordering;

/// An ordered collection of cells sharing a pack identifier.
///
/// Cloning a pack yields an independent cell sequence; this is how restore
/// points are taken before a tentative exchange.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pack {
    id: String,
    cells: Vec<Cell>,
}

impl Pack {
    /// Creates an empty pack.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    /// Creates a pack with an initial set of cells.
    pub fn with_cells(id: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Appends a cell. Duplicate addresses are allowed.
    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Removes and returns a uniformly random cell.
    ///
    /// The relative order of the remaining cells is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrialFailure`] if the pack is empty.
    pub fn remove_random_cell<R: Rng>(&mut self, rng: &mut R) -> Result<Cell> {
        if self.cells.is_empty() {
            return Err(Error::TrialFailure(format!(
                "cannot remove a cell from empty pack {}",
                self.id
            )));
        }
        let idx = rng.random_range(0..self.cells.len());
        Ok(self.cells.remove(idx))
    }

    /// Impedance spread: `(max - min) / mean` over the pack's cells.
    ///
    /// Returns exactly `0.0` when every cell has the same impedance, and
    /// `NaN` for an empty pack (packs are never empty by construction).
    ///
    /// # Complexity
    /// O(n), single pass, no allocation.
    pub fn spread(&self) -> f64 {
        if self.cells.is_empty() {
            return f64::NAN;
        }
        let (low, high, sum) = self.cells.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(low, high, sum), c| {
                let z = c.impedance();
                (low.min(z), high.max(z), sum + z)
            },
        );
        if high == low {
            return 0.0;
        }
        let mean = sum / self.cells.len() as f64;
        (high - low) / mean
    }

    /// Comparator ordering packs by ascending spread.
    ///
    /// Spread is recomputed on every call, so this is deliberately not an
    /// `Ord` impl: the key changes whenever cells move.
    pub fn by_spread(a: &Pack, b: &Pack) -> Ordering {
        a.spread().total_cmp(&b.spread())
    }
}
