//! CSV exports.
//!
//! Outputs are meant to be easy to consume in spreadsheets or downstream
//! scripts, so column names follow the source datasets (`Year`, `Quarter`,
//! `Real_House_Price`, ...). Parent directories are created on demand and
//! existing files are overwritten.

use std::fs::create_dir_all;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::align::AlignedFrame;
use crate::error::AppError;

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => create_dir_all(dir)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", dir.display()))),
        _ => Ok(()),
    }
}

/// Serialize `rows` to a CSV file with a header row derived from the row type.
///
/// Returns the number of data rows written.
pub fn write_csv<R: Serialize>(path: &Path, rows: impl IntoIterator<Item = R>) -> Result<usize, AppError> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;

    let mut n = 0usize;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write CSV row to '{}': {e}", path.display())))?;
        n += 1;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))?;

    info!("wrote {n} rows to {}", path.display());
    Ok(n)
}

/// Write an aligned frame as `Year, Quarter, <columns...>, t, Year_Quarter`.
pub fn write_aligned_frame(path: &Path, frame: &AlignedFrame) -> Result<usize, AppError> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;

    let mut header: Vec<&str> = vec!["Year", "Quarter"];
    header.extend(frame.columns().iter().map(String::as_str));
    header.extend(["t", "Year_Quarter"]);
    writer
        .write_record(&header)
        .map_err(|e| AppError::io(format!("Failed to write CSV header to '{}': {e}", path.display())))?;

    for row in frame.rows() {
        let mut record: Vec<String> = vec![row.key.year.to_string(), row.key.quarter.get().to_string()];
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.t.to_string());
        record.push(row.key.label());
        writer
            .write_record(&record)
            .map_err(|e| AppError::io(format!("Failed to write CSV row to '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))?;

    info!("wrote {} rows to {}", frame.len(), path.display());
    Ok(frame.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::domain::{Quarter, QuarterKey, QuarterlyObservation, QuarterlySeries};

    #[derive(Serialize)]
    struct Row {
        #[serde(rename = "Year")]
        year: i32,
        #[serde(rename = "Value")]
        value: Option<f64>,
    }

    #[test]
    fn write_csv_creates_directories_and_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let n = write_csv(
            &path,
            [Row { year: 2000, value: Some(1.5) }, Row { year: 2001, value: None }],
        )
        .unwrap();
        assert_eq!(n, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Year,Value\n2000,1.5\n2001,\n");
    }

    #[test]
    fn aligned_frame_export_layout() {
        let key = QuarterKey::new(2013, Quarter::Q2);
        let a = QuarterlySeries::new("A", vec![QuarterlyObservation { key, value: 1.0 }]).unwrap();
        let b = QuarterlySeries::new("B", vec![QuarterlyObservation { key, value: 2.5 }]).unwrap();
        let frame = align(&[&a, &b]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.csv");
        write_aligned_frame(&path, &frame).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Year,Quarter,A,B,t,Year_Quarter\n2013,2,1,2.5,8053,2013 Q2\n");
    }
}
