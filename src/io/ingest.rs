//! CSV ingest and normalization.
//!
//! This module turns the cleaned/processed CSV files into typed datasets that
//! are safe to join, deflate and fit.
//!
//! Rules:
//! - **Strict schema**: a missing required column is fatal (exit code 2)
//! - **Row-level coercion**: unparseable numeric cells drop the row; dropped
//!   rows are counted and logged, not printed one by one
//! - **Quarter labels** go through `Quarter::parse`; a bad label is fatal
//! - **No computation** here beyond parsing

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::{debug, warn};

use crate::domain::{
    AnnualPriceSalary, IncomeGroup, Quarter, QuarterKey, QuarterlyObservation, QuarterlySeries, YearlyValue,
    YearlyVolatility,
};
use crate::error::{AppError, ErrorKind};

/// A row-level problem that caused the row to be dropped.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed dataset plus bookkeeping about dropped rows.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub data: T,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

impl<T> Ingested<T> {
    pub fn rows_dropped(&self) -> usize {
        self.row_errors.len()
    }
}

/// Load a `Year, Quarter, <value_column>` file as a quarterly series named `value_column`.
pub fn load_quarterly_series(path: &Path, value_column: &str) -> Result<Ingested<QuarterlySeries>, AppError> {
    let mut reader = open_csv(path, true)?;
    let header_map = read_header_map(&mut reader, path)?;
    let [year_idx, quarter_idx, value_idx] = require_columns(&header_map, path, ["Year", "Quarter", value_column])?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let quarter = Quarter::parse(cell(&record, quarter_idx)).map_err(|e| {
            AppError::new(ErrorKind::InvalidQuarter, format!("{}:{line}: {e}", path.display()))
        })?;

        let Some(year) = parse_year(cell(&record, year_idx)) else {
            row_errors.push(RowError {
                line,
                message: "Missing/invalid `Year`.".to_string(),
            });
            continue;
        };
        let Some(value) = parse_f64(cell(&record, value_idx)) else {
            row_errors.push(RowError {
                line,
                message: format!("Missing/invalid `{value_column}`."),
            });
            continue;
        };

        observations.push(QuarterlyObservation {
            key: QuarterKey::new(year, quarter),
            value,
        });
    }

    report_dropped(path, rows_read, &row_errors);
    let series = QuarterlySeries::new(value_column, observations)?;

    Ok(Ingested {
        data: series,
        rows_read,
        row_errors,
    })
}

/// Load `Year, Real_House_Price, Real_Median_Salary`, sorted by year.
///
/// Rows without a year or a price are dropped; the salary may be missing.
pub fn load_price_salary(path: &Path) -> Result<Ingested<Vec<AnnualPriceSalary>>, AppError> {
    let mut reader = open_csv(path, true)?;
    let header_map = read_header_map(&mut reader, path)?;
    let [year_idx, price_idx, salary_idx] =
        require_columns(&header_map, path, ["Year", "Real_House_Price", "Real_Median_Salary"])?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let year = parse_year(cell(&record, year_idx));
        let price = parse_f64(cell(&record, price_idx));
        match (year, price) {
            (Some(year), Some(real_house_price)) => rows.push(AnnualPriceSalary {
                year,
                real_house_price,
                real_median_salary: parse_f64(cell(&record, salary_idx)),
            }),
            _ => row_errors.push(RowError {
                line,
                message: "Missing/invalid `Year` or `Real_House_Price`.".to_string(),
            }),
        }
    }

    report_dropped(path, rows_read, &row_errors);
    rows.sort_by_key(|r| r.year);

    Ok(Ingested {
        data: rows,
        rows_read,
        row_errors,
    })
}

/// Load the income-by-age file.
///
/// The source headers are not stable, so the first three columns are relabeled
/// positionally to `Age_Group, Median_Salary, Gender`. Rows with a non-numeric
/// salary are dropped.
pub fn load_income_groups(path: &Path) -> Result<Ingested<Vec<IncomeGroup>>, AppError> {
    let mut reader = open_csv(path, true)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();
    if headers.len() < 3 {
        return Err(AppError::schema(format!(
            "'{}' must have at least 3 columns (Age_Group, Median_Salary, Gender), found {}.",
            path.display(),
            headers.len()
        )));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(median_salary) = parse_f64(cell(&record, 1)) else {
            row_errors.push(RowError {
                line,
                message: "Missing/invalid `Median_Salary`.".to_string(),
            });
            continue;
        };

        rows.push(IncomeGroup {
            age_group: cell(&record, 0).to_string(),
            median_salary,
            gender: cell(&record, 2).to_string(),
        });
    }

    report_dropped(path, rows_read, &row_errors);

    Ok(Ingested {
        data: rows,
        rows_read,
        row_errors,
    })
}

/// Load `Year, Price_STD, Transaction_Count`, sorted by year.
pub fn load_yearly_volatility(path: &Path) -> Result<Ingested<Vec<YearlyVolatility>>, AppError> {
    let mut reader = open_csv(path, true)?;
    let header_map = read_header_map(&mut reader, path)?;
    let [year_idx, std_idx, count_idx] =
        require_columns(&header_map, path, ["Year", "Price_STD", "Transaction_Count"])?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let year = parse_year(cell(&record, year_idx));
        let count = parse_f64(cell(&record, count_idx)).filter(|c| *c >= 0.0 && c.fract() == 0.0);
        match (year, count) {
            (Some(year), Some(count)) => rows.push(YearlyVolatility {
                year,
                price_std: parse_f64(cell(&record, std_idx)),
                transaction_count: count as u64,
            }),
            _ => row_errors.push(RowError {
                line,
                message: "Missing/invalid `Year` or `Transaction_Count`.".to_string(),
            }),
        }
    }

    report_dropped(path, rows_read, &row_errors);
    rows.sort_by_key(|r| r.year);

    Ok(Ingested {
        data: rows,
        rows_read,
        row_errors,
    })
}

/// Load a `Year, <value_column>` file, sorted by year.
pub fn load_yearly_values(path: &Path, value_column: &str) -> Result<Ingested<Vec<YearlyValue>>, AppError> {
    let mut reader = open_csv(path, true)?;
    let header_map = read_header_map(&mut reader, path)?;
    let [year_idx, value_idx] = require_columns(&header_map, path, ["Year", value_column])?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match (parse_year(cell(&record, year_idx)), parse_f64(cell(&record, value_idx))) {
            (Some(year), Some(value)) => rows.push(YearlyValue { year, value }),
            _ => row_errors.push(RowError {
                line,
                message: format!("Missing/invalid `Year` or `{value_column}`."),
            }),
        }
    }

    report_dropped(path, rows_read, &row_errors);
    rows.sort_by_key(|r| r.year);

    Ok(Ingested {
        data: rows,
        rows_read,
        row_errors,
    })
}

/// Open a CSV file with the project's reader settings (flexible rows, trimmed cells).
pub(crate) fn open_csv(path: &Path, has_headers: bool) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;

    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

pub(crate) fn read_header_map(
    reader: &mut csv::Reader<File>,
    path: &Path,
) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read CSV headers of '{}': {e}", path.display())))?;
    Ok(build_header_map(headers))
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Resolve column names (case-insensitive) to indices, failing on the first missing one.
pub(crate) fn require_columns<const N: usize>(
    header_map: &HashMap<String, usize>,
    path: &Path,
    names: [&str; N],
) -> Result<[usize; N], AppError> {
    let mut out = [0usize; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = *header_map.get(&normalize_header_name(name)).ok_or_else(|| {
            AppError::schema(format!("Missing required column `{name}` in '{}'.", path.display()))
        })?;
    }
    Ok(out)
}

/// Cell text, or `""` for short rows.
pub(crate) fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

/// Parse a finite float; blanks, `null`, `NaN` and junk all map to `None`.
pub(crate) fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a year written either as an integer or as an integral float (`2011.0`).
pub(crate) fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = parse_f64(s)?;
    if v.fract() == 0.0 && v.abs() < f64::from(i32::MAX) {
        Some(v as i32)
    } else {
        None
    }
}

fn report_dropped(path: &Path, rows_read: usize, row_errors: &[RowError]) {
    if row_errors.is_empty() {
        debug!("{}: read {rows_read} rows", path.display());
        return;
    }
    warn!(
        "{}: dropped {} of {rows_read} rows with missing or invalid values",
        path.display(),
        row_errors.len()
    );
    for e in row_errors {
        debug!("{}:{}: {}", path.display(), e.line, e.message);
    }
}
