//! Read/write forecast model JSON files.
//!
//! The model JSON is the portable record of a `forecast` run:
//! - fitted line (slope + intercept on the quarterly time axis)
//! - train/test sizes and hold-out RMSE
//! - the forecast points themselves

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LinearModel, TimePoint};
use crate::error::AppError;
use crate::fit::TrendFit;
use crate::io::export::ensure_parent_dir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub series: String,
    pub model: LinearModel,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_rmse: Option<f64>,
    pub forecast: Vec<TimePoint>,
}

impl ForecastFile {
    pub fn new(series: &str, fit: &TrendFit, forecast: &[TimePoint]) -> Self {
        Self {
            tool: "housing".to_string(),
            generated_at: Utc::now(),
            series: series.to_string(),
            model: fit.model,
            train_rows: fit.train.len(),
            test_rows: fit.test.len(),
            test_rmse: fit.test_rmse,
            forecast: forecast.to_vec(),
        }
    }
}

/// Write a forecast model JSON file.
pub fn write_forecast_json(path: &Path, file: &ForecastFile) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let out = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create model JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::io(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a forecast model JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let parsed: ForecastFile =
        serde_json::from_reader(file).map_err(|e| AppError::schema(format!("Invalid model JSON: {e}")))?;
    Ok(parsed)
}
