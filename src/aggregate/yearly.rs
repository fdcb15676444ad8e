//! Quarterly bank rate → yearly averages.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::clean::BANK_RATE_COLUMN;
use crate::domain::YearlyValue;
use crate::error::AppError;
use crate::io::export::write_csv;
use crate::io::ingest::load_yearly_values;

pub const BANK_RATE_YEARLY_COLUMN: &str = "Bank_Rate_Yearly_Avg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankRateYearlyRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Bank_Rate_Yearly_Avg")]
    pub rate: f64,
}

/// Mean value per year, in ascending year order.
pub fn yearly_means(values: &[YearlyValue]) -> Vec<YearlyValue> {
    let mut buckets: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for v in values {
        let entry = buckets.entry(v.year).or_insert((0.0, 0));
        entry.0 += v.value;
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(year, (sum, n))| YearlyValue {
            year,
            value: sum / n as f64,
        })
        .collect()
}

/// Average the quarterly bank rate file per year and write `Year, Bank_Rate_Yearly_Avg`.
pub fn aggregate_bank_rate_yearly(input: &Path, output: &Path) -> Result<Vec<BankRateYearlyRow>, AppError> {
    let quarterly = load_yearly_values(input, BANK_RATE_COLUMN)?;
    let rows: Vec<BankRateYearlyRow> = yearly_means(&quarterly.data)
        .into_iter()
        .map(|v| BankRateYearlyRow {
            year: v.year,
            rate: v.value,
        })
        .collect();

    write_csv(output, &rows)?;
    Ok(rows)
}
