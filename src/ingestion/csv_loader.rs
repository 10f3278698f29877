//! CSV Loader - reads a delimited export into a header + rows table.

use crate::error::{LookupError, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A loaded table: trimmed headers and rows padded to the header width.
/// Empty cells stand for null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Position of a column that must exist
    pub fn require_column(&self, table: &str, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            LookupError::DataUnavailable(format!(
                "{} is missing required column '{}' (found: {:?})",
                table, name, self.headers
            ))
        })
    }

    /// Cell value at (row, column), `None` when empty
    pub fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
        idx.and_then(|i| row.get(i))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a CSV file from disk
pub fn read_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        LookupError::DataUnavailable(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let table = parse(file).map_err(|e| {
        LookupError::DataUnavailable(format!("Failed to read {}: {}", path.display(), e))
    })?;
    debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Read CSV text already in memory
pub fn read_table_from_str(text: &str) -> Result<RawTable> {
    parse(text.as_bytes())
}

fn parse<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row = (0..headers.len())
            .map(|idx| record.get(idx).unwrap_or("").trim().to_string())
            .collect::<Vec<_>>();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}
