//! Monthly UK average house price → quarterly averages in whole pounds.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::clean::dates::{date_to_key, parse_month};
use crate::clean::{CleanOutcome, FIRST_YEAR, round_to};
use crate::domain::QuarterlySeries;
use crate::error::AppError;
use crate::io::export::write_csv;
use crate::io::ingest::{cell, open_csv, parse_f64};

pub const HOUSE_PRICE_COLUMN: &str = "UK_Average_House_Price";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousePriceQuarterlyRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "UK_Average_House_Price")]
    pub price: i64,
}

/// Read the headerless monthly export (first line skipped), keep 2011 onwards,
/// average per quarter and round to whole pounds.
///
/// Column 1 is a month label (`"Jan 2011"`), column 2 a price that may contain
/// thousands separators.
pub fn clean_house_price(input: &Path, output: &Path) -> Result<CleanOutcome<HousePriceQuarterlyRow>, AppError> {
    let mut reader = open_csv(input, false)?;

    let mut raw = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for result in reader.records().skip(1) {
        rows_read += 1;
        let Ok(record) = result else {
            rows_dropped += 1;
            continue;
        };

        let key = parse_month(cell(&record, 0)).and_then(date_to_key);
        let price = parse_f64(&cell(&record, 1).replace(',', ""));
        match (key, price) {
            (Some(key), Some(price)) => {
                if key.year >= FIRST_YEAR {
                    raw.push((key, price));
                }
            }
            _ => rows_dropped += 1,
        }
    }

    let series = QuarterlySeries::from_averaged(HOUSE_PRICE_COLUMN, raw);
    let rows: Vec<HousePriceQuarterlyRow> = series
        .observations()
        .iter()
        .map(|o| HousePriceQuarterlyRow {
            year: o.key.year,
            quarter: o.key.quarter.label(),
            price: round_to(o.value, 0) as i64,
        })
        .collect();

    write_csv(output, &rows)?;
    info!("house price: {rows_read} monthly rows read, {rows_dropped} dropped, {} quarters", rows.len());

    Ok(CleanOutcome {
        rows,
        rows_read,
        rows_dropped,
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_prices_become_quarterly_whole_pounds() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("prices.csv");
        std::fs::write(
            &input,
            "Average price,United Kingdom\n\
             Dec 2010,\"160,000\"\n\
             Jan 2011,\"160,001\"\n\
             Feb 2011,160002\n\
             Mar 2011,\"160,004\"\n\
             Apr 2011,170000,extra\n\
             Total,n/a\n",
        )
        .unwrap();
        let output = dir.path().join("uk_house_price_quarterly.csv");

        let out = clean_house_price(&input, &output).unwrap();
        assert_eq!(out.rows_read, 6);
        assert_eq!(out.rows_dropped, 1);
        assert_eq!(
            out.rows,
            vec![
                HousePriceQuarterlyRow { year: 2011, quarter: "Q1".into(), price: 160_002 },
                HousePriceQuarterlyRow { year: 2011, quarter: "Q2".into(), price: 170_000 },
            ]
        );
    }
}
