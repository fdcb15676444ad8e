//! Daily Bank of England base rate → quarterly averages.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::clean::dates::{date_to_key, parse_date};
use crate::clean::{CleanOutcome, FIRST_YEAR, round_to};
use crate::domain::QuarterlySeries;
use crate::error::AppError;
use crate::io::export::write_csv;
use crate::io::ingest::{cell, open_csv, parse_f64, read_header_map, require_columns};

pub const BANK_RATE_COLUMN: &str = "Bank_Rate_Quarterly_Avg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankRateQuarterlyRow {
    #[serde(rename = "Year")]
    pub year: i32,
    /// Symbolic label, `Q1`..`Q4`.
    #[serde(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Bank_Rate_Quarterly_Avg")]
    pub rate: f64,
}

/// Read `Date, Bank Rate`, keep years from 2011, average per quarter (4 dp).
pub fn clean_bank_rate(input: &Path, output: &Path) -> Result<CleanOutcome<BankRateQuarterlyRow>, AppError> {
    let mut reader = open_csv(input, true)?;
    let header_map = read_header_map(&mut reader, input)?;
    let [date_idx, rate_idx] = require_columns(&header_map, input, ["Date", "Bank Rate"])?;

    let mut raw = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for result in reader.records() {
        rows_read += 1;
        let Ok(record) = result else {
            rows_dropped += 1;
            continue;
        };

        let key = parse_date(cell(&record, date_idx)).and_then(date_to_key);
        let rate = parse_f64(cell(&record, rate_idx));
        match (key, rate) {
            (Some(key), Some(rate)) => {
                if key.year >= FIRST_YEAR {
                    raw.push((key, rate));
                }
            }
            _ => rows_dropped += 1,
        }
    }

    let series = QuarterlySeries::from_averaged(BANK_RATE_COLUMN, raw);
    let rows: Vec<BankRateQuarterlyRow> = series
        .observations()
        .iter()
        .map(|o| BankRateQuarterlyRow {
            year: o.key.year,
            quarter: o.key.quarter.label(),
            rate: round_to(o.value, 4),
        })
        .collect();

    write_csv(output, &rows)?;
    info!("bank rate: {rows_read} daily rows read, {rows_dropped} dropped, {} quarters", rows.len());

    Ok(CleanOutcome {
        rows,
        rows_read,
        rows_dropped,
        output: output.to_path_buf(),
    })
}
