//! Rescale a nominal series to a fixed base period using CPI.
//!
//! ```text
//! real_t = nominal_t * (cpi_base / cpi_t)
//! ```
//!
//! The base period is the earliest row of the aligned frame unless the caller
//! pins a quarter explicitly. At the base row the ratio is exactly 1, so the
//! real value equals the nominal value.

use log::info;

use crate::align::AlignedFrame;
use crate::domain::BasePeriod;
use crate::error::{AppError, ErrorKind};

pub const CPI_BASE_COLUMN: &str = "CPI_Base";
pub const REAL_PRICE_COLUMN: &str = "Real_House_Price";

/// Result of deflating one nominal column of an aligned frame.
#[derive(Debug, Clone)]
pub struct DeflatedSeries {
    /// Input frame with `CPI_Base` and the real-value column appended.
    pub frame: AlignedFrame,
    pub cpi_base: f64,
    /// Row index of the base period within `frame`.
    pub base_row: usize,
    pub nominal_column: String,
    pub cpi_column: String,
    pub real_column: String,
}

impl DeflatedSeries {
    pub fn nominal(&self) -> Result<Vec<f64>, AppError> {
        self.frame.column(&self.nominal_column)
    }

    pub fn real(&self) -> Result<Vec<f64>, AppError> {
        self.frame.column(&self.real_column)
    }
}

/// Deflate `nominal_column` by `cpi_column`, appending `CPI_Base` and `real_column`.
///
/// Fails with `InvalidCpi` if any CPI value is zero, negative or non-finite,
/// and with `EmptyData` if the frame has no rows.
pub fn deflate(
    frame: &AlignedFrame,
    nominal_column: &str,
    cpi_column: &str,
    real_column: &str,
    base: BasePeriod,
) -> Result<DeflatedSeries, AppError> {
    if frame.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyData,
            "Cannot deflate: the aligned frame is empty (no quarter is shared by all inputs).",
        ));
    }

    let nominal = frame.column(nominal_column)?;
    let cpi = frame.column(cpi_column)?;

    if let Some((row, bad)) = frame
        .rows()
        .iter()
        .zip(&cpi)
        .find(|(_, c)| !(c.is_finite() && **c > 0.0))
    {
        return Err(AppError::new(
            ErrorKind::InvalidCpi,
            format!("Invalid CPI value {bad} at {}: must be finite and > 0.", row.key.label()),
        ));
    }

    let base_row = match base {
        BasePeriod::FirstRow => 0,
        BasePeriod::Quarter(key) => frame.rows().iter().position(|r| r.key == key).ok_or_else(|| {
            AppError::new(
                ErrorKind::EmptyData,
                format!("Base period {} is not present in the aligned frame.", key.label()),
            )
        })?,
    };
    let cpi_base = cpi[base_row];

    let real: Vec<f64> = nominal
        .iter()
        .zip(&cpi)
        .enumerate()
        .map(|(i, (&n, &c))| if i == base_row { n } else { n * (cpi_base / c) })
        .collect();

    let mut out = frame.clone();
    out.push_column(CPI_BASE_COLUMN, vec![cpi_base; frame.len()])?;
    out.push_column(real_column, real)?;

    info!(
        "deflated {} rows of `{nominal_column}` (base {} CPI={cpi_base})",
        out.len(),
        out.rows()[base_row].key.label()
    );

    Ok(DeflatedSeries {
        frame: out,
        cpi_base,
        base_row,
        nominal_column: nominal_column.to_string(),
        cpi_column: cpi_column.to_string(),
        real_column: real_column.to_string(),
    })
}
