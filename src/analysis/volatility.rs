//! Yearly price volatility against the yearly bank rate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{YearlyValue, YearlyVolatility};
use crate::error::AppError;
use crate::math::{Correlation, pearson};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolatilityRateRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Price_STD")]
    pub price_std: f64,
    #[serde(rename = "Transaction_Count")]
    pub transaction_count: u64,
    #[serde(rename = "Bank_Rate_Yearly_Avg")]
    pub bank_rate: f64,
}

#[derive(Debug, Clone)]
pub struct VolatilityVsRate {
    pub rows: Vec<VolatilityRateRow>,
    pub correlation: Correlation,
}

/// Inner join on year. Years with no standard deviation are dropped.
pub fn join_on_year(volatility: &[YearlyVolatility], rates: &[YearlyValue]) -> Vec<VolatilityRateRow> {
    let rate_by_year: BTreeMap<i32, f64> = rates.iter().map(|r| (r.year, r.value)).collect();

    let mut rows: Vec<VolatilityRateRow> = volatility
        .iter()
        .filter_map(|v| {
            let price_std = v.price_std?;
            let bank_rate = *rate_by_year.get(&v.year)?;
            Some(VolatilityRateRow {
                year: v.year,
                price_std,
                transaction_count: v.transaction_count,
                bank_rate,
            })
        })
        .collect();
    rows.sort_by_key(|r| r.year);
    rows
}

pub fn volatility_vs_rate(volatility: &[YearlyVolatility], rates: &[YearlyValue]) -> Result<VolatilityVsRate, AppError> {
    let rows = join_on_year(volatility, rates);
    let x: Vec<f64> = rows.iter().map(|r| r.bank_rate).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.price_std).collect();
    let correlation = pearson(&x, &y)?;
    Ok(VolatilityVsRate { rows, correlation })
}
