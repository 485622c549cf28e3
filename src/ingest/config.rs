//! Ingestion configuration.

use crate::error::{Error, Result};

/// Pack size of the original 12-cell LiFePO4 product.
pub const DEFAULT_CELLS_PER_PACK: usize = 12;

/// Order in which input readings are dealt into packs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssemblyOrder {
    /// Pack `0` receives the first `cells_per_pack` readings, pack `1`
    /// the next, and so on. Cells keep their input order inside a pack.
    #[default]
    Sequential,

    /// Readings are consumed from the end of the input (stack order):
    /// pack `0` receives the last `cells_per_pack` readings, last first.
    Reversed,
}

/// Configuration for turning readings into an [`Inventory`](crate::model::Inventory).
///
/// # Examples
///
/// ```
/// use u_cellpack::ingest::{AssemblyOrder, IngestConfig};
///
/// let config = IngestConfig::default()
///     .with_cells_per_pack(4)
///     .with_order(AssemblyOrder::Reversed);
/// assert_eq!(config.cells_per_pack, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Number of cells in every pack.
    pub cells_per_pack: usize,

    /// How readings are dealt into packs.
    pub order: AssemblyOrder,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            cells_per_pack: DEFAULT_CELLS_PER_PACK,
            order: AssemblyOrder::default(),
        }
    }
}

impl IngestConfig {
    pub fn with_cells_per_pack(mut self, n: usize) -> Self {
        self.cells_per_pack = n;
        self
    }

    pub fn with_order(mut self, order: AssemblyOrder) -> Self {
        self.order = order;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.cells_per_pack == 0 {
            return Err(Error::Configuration(
                "cells_per_pack must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.cells_per_pack, 12);
        assert_eq!(config.order, AssemblyOrder::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_pack_size() {
        let config = IngestConfig::default().with_cells_per_pack(0);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }
}
