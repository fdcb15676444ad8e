//! Raw CPI export → quarterly averages.
//!
//! The source file starts with annual and quarterly summary rows; the first
//! `CPI_SKIP_ROWS` data rows are dropped so that only the finer-grained rows
//! remain, which are then averaged per quarter.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::clean::CleanOutcome;
use crate::clean::dates::parse_period;
use crate::domain::QuarterlySeries;
use crate::error::AppError;
use crate::io::export::write_csv;
use crate::io::ingest::{cell, open_csv, parse_f64};

/// Leading data rows of the raw CPI export that are not part of the series.
pub const CPI_SKIP_ROWS: usize = 455;
pub const CPI_COLUMN: &str = "CPI_Quarterly_Avg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpiQuarterlyRow {
    #[serde(rename = "Year")]
    pub year: i32,
    /// Numeric quarter, `1`..`4`.
    #[serde(rename = "Quarter")]
    pub quarter: u8,
    #[serde(rename = "CPI_Quarterly_Avg")]
    pub cpi: f64,
}

/// Clean the raw CPI export using the standard row offset.
pub fn clean_cpi(input: &Path, output: &Path) -> Result<CleanOutcome<CpiQuarterlyRow>, AppError> {
    clean_cpi_with_skip(input, output, CPI_SKIP_ROWS)
}

/// Clean a CPI export: skip `skip_rows` data rows, read period (col 1) and index (col 2).
pub fn clean_cpi_with_skip(
    input: &Path,
    output: &Path,
    skip_rows: usize,
) -> Result<CleanOutcome<CpiQuarterlyRow>, AppError> {
    let mut reader = open_csv(input, true)?;

    let mut raw = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for result in reader.records().skip(skip_rows) {
        rows_read += 1;
        let Ok(record) = result else {
            rows_dropped += 1;
            continue;
        };

        match (parse_period(cell(&record, 0)), parse_f64(cell(&record, 1))) {
            (Some(key), Some(value)) => raw.push((key, value)),
            _ => rows_dropped += 1,
        }
    }

    let series = QuarterlySeries::from_averaged(CPI_COLUMN, raw);
    let rows: Vec<CpiQuarterlyRow> = series
        .observations()
        .iter()
        .map(|o| CpiQuarterlyRow {
            year: o.key.year,
            quarter: o.key.quarter.get(),
            cpi: o.value,
        })
        .collect();

    write_csv(output, &rows)?;
    info!("cpi: {rows_read} rows read after offset, {rows_dropped} dropped, {} quarters", rows.len());

    Ok(CleanOutcome {
        rows,
        rows_read,
        rows_dropped,
        output: output.to_path_buf(),
    })
}
