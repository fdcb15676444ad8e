//! Shared domain types.
//!
//! These types are intentionally small and `Copy` where possible so they can be:
//!
//! - carried through the join/deflate/fit stages without cloning frames
//! - exported to CSV/JSON
//! - used as ordered map keys during aggregation

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// A calendar quarter, always in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter(u8);

impl Quarter {
    pub const Q1: Quarter = Quarter(1);
    pub const Q2: Quarter = Quarter(2);
    pub const Q3: Quarter = Quarter(3);
    pub const Q4: Quarter = Quarter(4);

    /// Validate a numeric quarter.
    pub fn new(n: i64) -> Result<Self, AppError> {
        match n {
            1..=4 => Ok(Quarter(n as u8)),
            _ => Err(AppError::new(
                ErrorKind::InvalidQuarter,
                format!("Invalid quarter {n}: expected 1..=4."),
            )),
        }
    }

    /// Normalize a quarter label such as `"Q3"`, `"q3"`, `" 3 "` or `"3"`.
    ///
    /// The `Q` prefix is optional and case-insensitive; surrounding whitespace is
    /// ignored. The remaining token must be an integer in `1..=4`.
    pub fn parse(token: &str) -> Result<Self, AppError> {
        let trimmed = token.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed)
            .trim();

        let n: i64 = digits.parse().map_err(|_| {
            AppError::new(
                ErrorKind::InvalidQuarter,
                format!("Invalid quarter '{token}': expected Q1..Q4 or 1..4."),
            )
        })?;
        Self::new(n)
    }

    /// Month (1-based) to quarter.
    pub fn from_month(month: u32) -> Result<Self, AppError> {
        Self::new(((i64::from(month) - 1) / 3) + 1)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Symbolic label (`"Q1"`..`"Q4"`).
    pub fn label(self) -> String {
        format!("Q{}", self.0)
    }
}

impl TryFrom<u8> for Quarter {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quarter::new(i64::from(value))
    }
}

impl From<Quarter> for u8 {
    fn from(value: Quarter) -> Self {
        value.0
    }
}

impl FromStr for Quarter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quarter::parse(s)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// The join key of every quarterly dataset.
///
/// Ordering is calendar order (year first, then quarter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    pub year: i32,
    pub quarter: Quarter,
}

impl QuarterKey {
    pub fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    /// Continuous quarterly time index: `t = year * 4 + (quarter - 1)`.
    ///
    /// Consecutive quarters differ by exactly 1, including across year
    /// boundaries.
    pub fn time_index(self) -> i64 {
        i64::from(self.year) * 4 + i64::from(self.quarter.get()) - 1
    }

    /// Human-readable label, e.g. `"2013 Q1"`.
    pub fn label(self) -> String {
        format!("{} {}", self.year, self.quarter)
    }
}

/// One value of one metric in one quarter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuarterlyObservation {
    pub key: QuarterKey,
    pub value: f64,
}

/// A named quarterly metric with at most one observation per quarter.
///
/// Observations are kept in calendar order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterlySeries {
    name: String,
    observations: Vec<QuarterlyObservation>,
}

impl QuarterlySeries {
    /// Build a series from pre-aggregated observations.
    ///
    /// Duplicate quarters are rejected: aggregation belongs to the cleaning
    /// jobs, not to the join.
    pub fn new(name: impl Into<String>, mut observations: Vec<QuarterlyObservation>) -> Result<Self, AppError> {
        let name = name.into();
        observations.sort_by_key(|o| o.key);

        if let Some(dup) = observations.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(AppError::schema(format!(
                "Series `{name}` has more than one row for {}; aggregate duplicates before aligning.",
                dup[0].key.label()
            )));
        }

        Ok(Self { name, observations })
    }

    /// Build a series by averaging every value that falls in the same quarter.
    pub fn from_averaged(name: impl Into<String>, raw: impl IntoIterator<Item = (QuarterKey, f64)>) -> Self {
        let mut buckets: BTreeMap<QuarterKey, (f64, usize)> = BTreeMap::new();
        for (key, value) in raw {
            let entry = buckets.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        let observations = buckets
            .into_iter()
            .map(|(key, (sum, n))| QuarterlyObservation {
                key,
                value: sum / n as f64,
            })
            .collect();

        Self {
            name: name.into(),
            observations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observations(&self) -> &[QuarterlyObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, key: QuarterKey) -> Option<f64> {
        self.observations
            .binary_search_by_key(&key, |o| o.key)
            .ok()
            .map(|idx| self.observations[idx].value)
    }

    /// The series on the continuous time axis, in ascending `t`.
    pub fn time_indexed(&self) -> Vec<TimePoint> {
        self.observations
            .iter()
            .map(|o| TimePoint {
                t: o.key.time_index(),
                value: o.value,
            })
            .collect()
    }
}

/// A value on the continuous quarterly time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub t: i64,
    pub value: f64,
}

/// `value ≈ slope * t + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

/// Which quarter defines the CPI scale when deflating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasePeriod {
    /// The earliest row of the aligned (joined) frame.
    #[default]
    FirstRow,
    /// A specific quarter, which must be present in the aligned frame.
    Quarter(QuarterKey),
}

/// One year of the real house price / real median salary dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualPriceSalary {
    pub year: i32,
    pub real_house_price: f64,
    /// Missing for years where only the price was published.
    pub real_median_salary: Option<f64>,
}

/// Median salary for one age group and gender.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeGroup {
    pub age_group: String,
    pub median_salary: f64,
    pub gender: String,
}

/// Yearly dispersion of transaction prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyVolatility {
    pub year: i32,
    /// Sample standard deviation; `None` for years with a single transaction.
    pub price_std: Option<f64>,
    pub transaction_count: u64,
}

/// A yearly average of some rate or index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyValue {
    pub year: i32,
    pub value: f64,
}
