//! Plain-text tables for the command line.

use crate::export::{export_columns, export_row};
use crate::lookup::CuLookupResult;
use crate::relations::ListingRecord;
use itertools::Itertools;

/// Render rows under a header with space-padded columns
pub fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..header.len())
        .map(|idx| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header[idx].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(header));
    out.push('\n');
    out.push_str(&widths.iter().map(|&w| "-".repeat(w)).join("-+-"));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Numbered listing table; the number is what `select --index` takes
pub fn listings(records: &[&ListingRecord]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let header: Vec<String> = std::iter::once("#".to_string())
        .chain(first.columns().iter().cloned())
        .collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            std::iter::once(idx.to_string())
                .chain(record.values().iter().cloned())
                .collect()
        })
        .collect();
    table(&header, &rows)
}

pub fn breakdown(result: &CuLookupResult) -> String {
    let header: Vec<String> = export_columns(result.columns)
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows: Vec<Vec<String>> = result
        .breakdown
        .iter()
        .map(|leaf| export_row(leaf, result.columns))
        .collect();
    table(&header, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_pads_columns() {
        let header = vec!["CU".to_string(), "Description".to_string()];
        let rows = vec![vec!["10".to_string(), "Bolt".to_string()]];
        let out = table(&header, &rows);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "CU | Description");
        assert_eq!(lines[1], "---+------------");
        assert_eq!(lines[2], "10 | Bolt");
    }

    #[test]
    fn test_empty_listing_renders_nothing() {
        assert!(listings(&[]).is_empty());
    }
}
