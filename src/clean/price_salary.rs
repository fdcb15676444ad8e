//! Raw real house price / real median salary export → three tidy columns.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::clean::CleanOutcome;
use crate::error::AppError;
use crate::io::export::write_csv;
use crate::io::ingest::{cell, open_csv, parse_f64, parse_year};

/// Leading data rows of the raw export that precede the series.
pub const PRICE_SALARY_SKIP_ROWS: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSalaryRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Real_House_Price")]
    pub real_house_price: f64,
    #[serde(rename = "Real_Median_Salary")]
    pub real_median_salary: Option<f64>,
}

/// Clean the raw export using the standard row offset.
pub fn clean_price_salary(input: &Path, output: &Path) -> Result<CleanOutcome<PriceSalaryRow>, AppError> {
    clean_price_salary_with_skip(input, output, PRICE_SALARY_SKIP_ROWS)
}

/// Skip `skip_rows` data rows, drop columns that are empty in every remaining
/// row (trailing commas), and relabel the first three columns to
/// `Year, Real_House_Price, Real_Median_Salary`.
///
/// Rows missing the year or the price are dropped; the salary may be empty.
pub fn clean_price_salary_with_skip(
    input: &Path,
    output: &Path,
    skip_rows: usize,
) -> Result<CleanOutcome<PriceSalaryRow>, AppError> {
    let mut reader = open_csv(input, true)?;

    let records: Vec<csv::StringRecord> = reader
        .records()
        .skip(skip_rows)
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::io(format!("Failed to read '{}': {e}", input.display())))?;

    let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
    let kept: Vec<usize> = (0..width)
        .filter(|&col| records.iter().any(|r| !cell(r, col).is_empty()))
        .take(3)
        .collect();
    let &[year_idx, price_idx, salary_idx] = kept.as_slice() else {
        return Err(AppError::schema(format!(
            "'{}' has {} non-empty columns after the row offset; expected at least 3.",
            input.display(),
            kept.len()
        )));
    };

    let rows_read = records.len();
    let rows: Vec<PriceSalaryRow> = records
        .iter()
        .filter_map(|r| {
            Some(PriceSalaryRow {
                year: parse_year(cell(r, year_idx))?,
                real_house_price: parse_f64(cell(r, price_idx))?,
                real_median_salary: parse_f64(cell(r, salary_idx)),
            })
        })
        .collect();
    let rows_dropped = rows_read - rows.len();

    write_csv(output, &rows)?;
    info!("real price/salary: {rows_read} rows read after offset, {rows_dropped} dropped");

    Ok(CleanOutcome {
        rows,
        rows_read,
        rows_dropped,
        output: output.to_path_buf(),
    })
}
