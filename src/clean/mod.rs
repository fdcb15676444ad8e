//! Cleaning jobs: raw source exports to tidy CSVs.
//!
//! Each job reads one raw file, coerces types (unparseable cells drop the
//! row), applies the dataset-specific slicing constants, averages duplicate
//! quarters, and writes a clean CSV. This is the only place where quarterly
//! aggregation happens; the analyses assume one row per quarter.

use std::path::PathBuf;

pub mod bank_rate;
pub mod cpi;
pub mod dates;
pub mod house_price;
pub mod price_salary;

pub use bank_rate::*;
pub use cpi::*;
pub use house_price::*;
pub use price_salary::*;

/// First calendar year kept by the bank rate and house price cleaners.
pub const FIRST_YEAR: i32 = 2011;

/// What a cleaning job produced.
#[derive(Debug, Clone)]
pub struct CleanOutcome<T> {
    pub rows: Vec<T>,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub output: PathBuf,
}

/// Round half-to-even at `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}
