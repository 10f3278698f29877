//! Breakdown export as CSV.
//!
//! Column order: CU, CHILD CU, STOCK CODE, QTY, SC Description, UOI, Price.
//! CHILD CU and QTY are left out when the breakdown source did not carry them.

use crate::error::{LookupError, Result};
use crate::lookup::{CuLookupResult, ResolvedLeaf};
use crate::relations::{columns, BreakdownColumns};
use csv::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const SC_DESCRIPTION: &str = "SC Description";
pub const UOI: &str = "UOI";
pub const PRICE: &str = "Price";

/// Header row for the given source columns
pub fn export_columns(present: BreakdownColumns) -> Vec<&'static str> {
    let mut header = vec![columns::CU];
    if present.child_cu {
        header.push(columns::CHILD_CU);
    }
    header.push(columns::STOCK_CODE);
    if present.qty {
        header.push(columns::QTY);
    }
    header.extend([SC_DESCRIPTION, UOI, PRICE]);
    header
}

/// One output row matching `export_columns`
pub fn export_row(leaf: &ResolvedLeaf, present: BreakdownColumns) -> Vec<String> {
    let mut row = vec![leaf.cu().to_string()];
    if present.child_cu {
        row.push(leaf.child_cu().unwrap_or("").to_string());
    }
    row.push(leaf.stock_code().to_string());
    if present.qty {
        row.push(leaf.quantity().map(format_quantity).unwrap_or_default());
    }
    row.push(leaf.description.clone());
    row.push(leaf.unit_of_issue.clone());
    row.push(leaf.price.clone());
    row
}

/// Integral quantities print without a fractional part
pub fn format_quantity(qty: f64) -> String {
    if qty.fract() == 0.0 && qty.abs() < 1e15 {
        format!("{}", qty as i64)
    } else {
        qty.to_string()
    }
}

pub fn export_file_name(cu_id: &str) -> String {
    format!("CU_{}_breakdown.csv", cu_id)
}

pub fn write_breakdown_csv<W: Write>(writer: W, result: &CuLookupResult) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(export_columns(result.columns))?;
    for leaf in &result.breakdown {
        wtr.write_record(export_row(leaf, result.columns))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the breakdown to `path`. An empty breakdown is not exported.
pub fn export_breakdown(path: impl AsRef<Path>, result: &CuLookupResult) -> Result<()> {
    let path = path.as_ref();
    if result.breakdown.is_empty() {
        return Err(LookupError::Export(format!(
            "No SC breakdown data found for CU {}",
            result.cu_id
        )));
    }
    let file = std::fs::File::create(path)?;
    write_breakdown_csv(file, result)?;
    info!(
        "Exported {} rows for CU {} to {}",
        result.breakdown.len(),
        result.cu_id,
        path.display()
    );
    Ok(())
}
