//! Yearly price volatility from the transaction-level price-paid file.
//!
//! The input is far larger than memory, so records are consumed in fixed-size
//! sequential chunks and folded into per-year running statistics. Only one
//! chunk and one accumulator per year are held at any time.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Datelike;
use csv::StringRecord;
use log::{debug, info};
use serde::Serialize;

use crate::clean::dates::parse_date;
use crate::error::AppError;
use crate::io::export::write_csv;
use crate::io::ingest::{cell, open_csv, parse_f64, read_header_map, require_columns};
use crate::math::RunningStats;

/// Records per chunk.
pub const CHUNK_SIZE: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyVolatilityRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Price_STD")]
    pub price_std: Option<f64>,
    #[serde(rename = "Transaction_Count")]
    pub transaction_count: u64,
}

/// Aggregate with the default chunk size.
pub fn aggregate_price_volatility(input: &Path, output: &Path) -> Result<Vec<YearlyVolatilityRow>, AppError> {
    aggregate_price_volatility_chunked(input, output, CHUNK_SIZE)
}

/// Read `Price` and `Date of Transfer` in chunks of `chunk_size` records and
/// write `Year, Price_STD, Transaction_Count` sorted by year.
///
/// Rows with an unparseable date or price are skipped.
pub fn aggregate_price_volatility_chunked(
    input: &Path,
    output: &Path,
    chunk_size: usize,
) -> Result<Vec<YearlyVolatilityRow>, AppError> {
    let chunk_size = chunk_size.max(1);
    let mut reader = open_csv(input, true)?;
    let header_map = read_header_map(&mut reader, input)?;
    let [price_idx, date_idx] = require_columns(&header_map, input, ["Price", "Date of Transfer"])?;

    let mut by_year: BTreeMap<i32, RunningStats> = BTreeMap::new();
    let mut chunk: Vec<StringRecord> = Vec::with_capacity(chunk_size.min(CHUNK_SIZE));
    let mut n_chunks = 0usize;
    let mut skipped = 0usize;

    for result in reader.records() {
        match result {
            Ok(record) => chunk.push(record),
            Err(_) => skipped += 1,
        }
        if chunk.len() == chunk_size {
            skipped += fold_chunk(&chunk, price_idx, date_idx, &mut by_year);
            chunk.clear();
            n_chunks += 1;
            debug!("processed chunk {n_chunks} ({} years so far)", by_year.len());
        }
    }
    if !chunk.is_empty() {
        skipped += fold_chunk(&chunk, price_idx, date_idx, &mut by_year);
        n_chunks += 1;
    }

    let rows: Vec<YearlyVolatilityRow> = by_year
        .into_iter()
        .map(|(year, stats)| YearlyVolatilityRow {
            year,
            price_std: stats.sample_std(),
            transaction_count: stats.count(),
        })
        .collect();

    info!("price paid: {n_chunks} chunks, {skipped} rows skipped, {} years", rows.len());
    write_csv(output, &rows)?;
    Ok(rows)
}

/// Fold one chunk into the per-year accumulators; returns the number of rows skipped.
fn fold_chunk(
    chunk: &[StringRecord],
    price_idx: usize,
    date_idx: usize,
    by_year: &mut BTreeMap<i32, RunningStats>,
) -> usize {
    let mut skipped = 0usize;
    for record in chunk {
        let date = parse_date(cell(record, date_idx));
        let price = parse_f64(cell(record, price_idx));
        match (date, price) {
            (Some(date), Some(price)) => by_year.entry(date.year()).or_default().push(price),
            _ => skipped += 1,
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_input(dir: &Path) -> std::path::PathBuf {
        let input = dir.join("price_paid_records.csv");
        std::fs::write(
            &input,
            "Transaction unique identifier,Price,Date of Transfer,Property Type\n\
             a,100000,1995-01-03 00:00,D\n\
             b,120000,1995-06-30 00:00,S\n\
             c,110000,1995-12-01 00:00,T\n\
             d,250000,1996-02-14 00:00,D\n\
             e,,1996-03-01 00:00,D\n\
             f,90000,garbage,F\n",
        )
        .unwrap();
        input
    }

    #[test]
    fn chunking_does_not_change_the_result() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());

        let whole = aggregate_price_volatility_chunked(&input, &dir.path().join("a.csv"), 1000).unwrap();
        let tiny = aggregate_price_volatility_chunked(&input, &dir.path().join("b.csv"), 2).unwrap();
        assert_eq!(whole, tiny);

        assert_eq!(whole.len(), 2);
        assert_eq!(whole[0].year, 1995);
        assert_eq!(whole[0].transaction_count, 3);
        assert!((whole[0].price_std.unwrap() - 10_000.0).abs() < 1e-6);
        assert_eq!(whole[1].transaction_count, 1);
        assert_eq!(whole[1].price_std, None);
    }
}
