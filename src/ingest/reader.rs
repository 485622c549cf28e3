//! CSV readings input.
//!
//! The input file carries a header row with (at least) a `cell_id` and a
//! `cell_value` column, matched case-insensitively:
//!
//! ```text
//! cell_ID,cell_value
//! A-01,0.00231
//! A-02,0.00228
//! ```

use super::assemble::build_inventory;
use super::config::IngestConfig;
use crate::error::{Error, Result};
use crate::model::{Cell, Inventory};
use std::io;
use std::path::Path;

const ID_COLUMN: &str = "cell_id";
const VALUE_COLUMN: &str = "cell_value";

/// Reads cell readings from CSV and assembles them into packs.
///
/// Ingestion is all-or-nothing: the first malformed row fails the call.
///
/// # Errors
///
/// - [`Error::MalformedRecord`] for a missing column (row `0` is the
///   header) or a value that is not a finite, non-negative number. Data
///   rows are numbered from 1.
/// - [`Error::Csv`] for structural CSV errors.
/// - Anything [`build_inventory`] returns.
pub fn read_csv<R: io::Read>(reader: R, config: &IngestConfig) -> Result<Inventory> {
    config.validate()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let cells = parse_cells(rdr)?;
    build_inventory(cells, config)
}

/// Reads a CSV file. See [`read_csv`].
pub fn read_csv_path(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Inventory> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading cell readings");
    let file = std::fs::File::open(path)?;
    read_csv(io::BufReader::new(file), config)
}

fn parse_cells<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<Cell>> {
    let headers = rdr.headers()?.clone();
    let id_col = find_column(&headers, ID_COLUMN)?;
    let value_col = find_column(&headers, VALUE_COLUMN)?;

    let mut cells = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let address = record
            .get(id_col)
            .ok_or_else(|| malformed(row, format!("missing {ID_COLUMN}")))?;
        let raw = record
            .get(value_col)
            .ok_or_else(|| malformed(row, format!("missing {VALUE_COLUMN}")))?;
        let impedance: f64 = raw
            .parse()
            .map_err(|e| malformed(row, format!("invalid {VALUE_COLUMN} {raw:?}: {e}")))?;
        if !impedance.is_finite() {
            return Err(malformed(row, format!("{VALUE_COLUMN} {raw:?} is not finite")));
        }
        if impedance < 0.0 {
            return Err(malformed(row, format!("{VALUE_COLUMN} {raw:?} is negative")));
        }

        cells.push(Cell::new(address, impedance));
    }
    Ok(cells)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| malformed(0, format!("header has no {name} column")))
}

fn malformed(row: usize, reason: String) -> Error {
    Error::MalformedRecord { row, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(n: usize) -> IngestConfig {
        IngestConfig::default().with_cells_per_pack(n)
    }

    #[test]
    fn test_reads_original_header_spelling() {
        let data = "cell_ID,cell_value\nA,1.0\nB,1.1\nC,0.9\nD,1.05\n";
        let inv = read_csv(data.as_bytes(), &config(2)).unwrap();
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.packs()[0].cells()[0].address(), "A");
        assert!((inv.packs()[1].cells()[1].impedance() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_extra_columns_and_reordered_headers() {
        let data = "cell_value,station,Cell_Id\n1.0,x,A\n2.0,y,B\n";
        let inv = read_csv(data.as_bytes(), &config(2)).unwrap();
        let cells = inv.packs()[0].cells();
        assert_eq!(cells[1].address(), "B");
        assert!((cells[1].impedance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let data = "cell_id , cell_value\n A , 1.5 \n";
        let inv = read_csv(data.as_bytes(), &config(1)).unwrap();
        assert_eq!(inv.packs()[0].cells()[0].address(), "A");
    }

    #[test]
    fn test_malformed_value_fails_whole_import() {
        let data = "cell_id,cell_value\nA,1.0\nB,abc\nC,1.0\nD,1.0\n";
        let err = read_csv(data.as_bytes(), &config(2)).unwrap_err();
        match err {
            Error::MalformedRecord { row, reason } => {
                assert_eq!(row, 2);
                assert!(reason.contains("abc"), "got {reason}");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let data = "cell_id,cell_value\nA,NaN\n";
        assert!(matches!(
            read_csv(data.as_bytes(), &config(1)),
            Err(Error::MalformedRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_negative_value_rejected() {
        let data = "cell_id,cell_value\nA,-0.002\nB,-0.001\nC,-0.001\nD,0.001\n";
        match read_csv(data.as_bytes(), &config(2)).unwrap_err() {
            Error::MalformedRecord { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("negative"), "got {reason}");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_value_accepted() {
        let data = "cell_id,cell_value\nA,0\nB,0\n";
        let inv = read_csv(data.as_bytes(), &config(2)).unwrap();
        assert_eq!(inv.packs()[0].spread(), 0.0);
    }

    #[test]
    fn test_missing_column() {
        let data = "id,value\nA,1.0\n";
        assert!(matches!(
            read_csv(data.as_bytes(), &config(1)),
            Err(Error::MalformedRecord { row: 0, .. })
        ));
    }

    #[test]
    fn test_partition_checked_after_parsing() {
        let data = "cell_id,cell_value\nA,1\nB,1\nC,1\n";
        assert!(matches!(
            read_csv(data.as_bytes(), &config(2)),
            Err(Error::InvalidPartition { cells: 3, .. })
        ));
    }

    #[test]
    fn test_read_csv_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cell_id,cell_value").unwrap();
        for i in 0..8 {
            writeln!(file, "c{i},{}", 0.002 + i as f64 * 1e-5).unwrap();
        }
        file.flush().unwrap();

        let inv = read_csv_path(file.path(), &config(4)).unwrap();
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.cell_count(), 8);
    }

    #[test]
    fn test_read_csv_path_missing_file() {
        let err = read_csv_path("/definitely/not/here.csv", &config(4)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
