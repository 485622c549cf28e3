//! Battery cell value type.

use std::fmt;
use std::sync::Arc;

/// A single measured cell: its address and impedance in ohms.
///
/// Cells are immutable. The address is reference-counted so that moving
/// cells between packs and snapshotting packs never copies string data.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    address: Arc<str>,
    impedance: f64,
}

impl Cell {
    /// Creates a cell.
    ///
    /// Impedances are expected to be finite and non-negative; pack spreads
    /// are only meaningful for such values. [`build_inventory`] and the CSV
    /// reader reject anything else.
    ///
    /// [`build_inventory`]: crate::ingest::build_inventory
    pub fn new(address: impl Into<Arc<str>>, impedance: f64) -> Self {
        Self {
            address: address.into(),
            impedance,
        }
    }

    /// Address of the cell (e.g. its position label on the test rig).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Measured impedance.
    pub fn impedance(&self) -> f64 {
        self.impedance
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.address, self.impedance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let c = Cell::new("A-01", 0.00123);
        assert_eq!(c.address(), "A-01");
        assert!((c.impedance() - 0.00123).abs() < 1e-15);
    }

    #[test]
    fn test_clone_shares_address() {
        let c = Cell::new(String::from("B-07"), 0.002);
        let d = c.clone();
        assert!(Arc::ptr_eq(&c.address, &d.address));
    }
}
