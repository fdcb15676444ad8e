//! House price growth against the bank rate, quarter by quarter.

use serde::Serialize;

use crate::align::align;
use crate::domain::{QuarterKey, QuarterlySeries};
use crate::error::AppError;
use crate::math::{Correlation, pct_change, pearson};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterlyChangeRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Bank_Rate_Quarterly_Avg")]
    pub bank_rate: f64,
    #[serde(rename = "UK_Average_House_Price")]
    pub house_price: f64,
    #[serde(rename = "House_Price_Pct_Change")]
    pub pct_change: f64,
}

impl QuarterlyChangeRow {
    fn new(key: QuarterKey, bank_rate: f64, house_price: f64, pct_change: f64) -> Self {
        Self {
            year: key.year,
            quarter: key.quarter.label(),
            bank_rate,
            house_price,
            pct_change,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuarterlyChanges {
    pub rows: Vec<QuarterlyChangeRow>,
    pub correlation: Correlation,
}

/// Align both series, compute the house price % change and correlate it
/// with the bank rate.
///
/// The first aligned quarter has no predecessor and is dropped.
pub fn quarterly_changes(bank_rate: &QuarterlySeries, house_price: &QuarterlySeries) -> Result<QuarterlyChanges, AppError> {
    let frame = align(&[bank_rate, house_price])?;
    let rates = frame.column(bank_rate.name())?;
    let prices = frame.column(house_price.name())?;

    let rows: Vec<QuarterlyChangeRow> = pct_change(&prices)
        .into_iter()
        .enumerate()
        .filter_map(|(i, change)| {
            change.map(|c| QuarterlyChangeRow::new(frame.rows()[i].key, rates[i], prices[i], c))
        })
        .collect();

    let x: Vec<f64> = rows.iter().map(|r| r.bank_rate).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.pct_change).collect();
    let correlation = pearson(&x, &y)?;

    Ok(QuarterlyChanges { rows, correlation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Quarter, QuarterlyObservation};
    use crate::error::ErrorKind;

    fn series(name: &str, start_year: i32, values: &[f64]) -> QuarterlySeries {
        let obs = values
            .iter()
            .enumerate()
            .map(|(i, &value)| QuarterlyObservation {
                key: QuarterKey::new(start_year + (i / 4) as i32, Quarter::new((i % 4) as i64 + 1).unwrap()),
                value,
            })
            .collect();
        QuarterlySeries::new(name, obs).unwrap()
    }

    #[test]
    fn first_quarter_dropped_and_growth_correlated() {
        let bank = series("Bank_Rate_Quarterly_Avg", 2012, &[0.5, 1.0, 2.0, 3.0, 4.0]);
        let house = series("UK_Average_House_Price", 2012, &[100.0, 110.0, 121.0, 127.05, 127.05]);

        let out = quarterly_changes(&bank, &house).unwrap();
        assert_eq!(out.rows.len(), 4);
        assert_eq!(out.rows[0].quarter, "Q2");
        assert!((out.rows[0].pct_change - 10.0).abs() < 1e-9);
        assert!((out.rows[3].pct_change).abs() < 1e-9);
        assert!(out.correlation.r < 0.0);
        assert_eq!(out.correlation.n, 4);
    }

    #[test]
    fn too_few_overlapping_quarters() {
        let bank = series("Bank_Rate_Quarterly_Avg", 2012, &[0.5, 1.0, 2.0]);
        let house = series("UK_Average_House_Price", 2012, &[100.0, 110.0, 121.0]);
        let err = quarterly_changes(&bank, &house).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }
}
