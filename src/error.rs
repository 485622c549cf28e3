//! Error types shared by ingestion, the balancing engine and reporting.

use std::io;

/// Errors produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The number of cells is not a multiple of the requested pack size.
    #[error(
        "{cells} cells cannot be divided into packs of {cells_per_pack} \
         ({} left over)",
        left_over(.cells, .cells_per_pack)
    )]
    InvalidPartition { cells: usize, cells_per_pack: usize },

    /// A balancing run needs at least two packs to exchange cells.
    #[error("at least 2 packs are required to balance, found {found}")]
    InsufficientPacks { found: usize },

    /// A single trial hit an internal inconsistency and was abandoned.
    #[error("trial failed: {0}")]
    TrialFailure(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// `start` was called on an engine that is already running.
    #[error("balancer is already running")]
    AlreadyRunning,

    /// An input row could not be turned into a cell.
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

fn left_over(cells: &usize, cells_per_pack: &usize) -> usize {
    cells.checked_rem(*cells_per_pack).unwrap_or(*cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_partition_message_states_mismatch() {
        let err = Error::InvalidPartition {
            cells: 10,
            cells_per_pack: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 cells"), "got {msg}");
        assert!(msg.contains("packs of 4"), "got {msg}");
        assert!(msg.contains("2 left over"), "got {msg}");
    }

    #[test]
    fn test_insufficient_packs_message() {
        let err = Error::InsufficientPacks { found: 1 };
        assert_eq!(
            err.to_string(),
            "at least 2 packs are required to balance, found 1"
        );
    }
}
