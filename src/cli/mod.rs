//! Command-line parsing for the housing pipeline.
//!
//! Argument parsing stays here; dispatch lives in `app`, and the jobs
//! themselves never see clap types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::aggregate::CHUNK_SIZE;
use crate::fit::{DEFAULT_HORIZON, DEFAULT_TEST_QUARTERS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "housing", version, about = "UK house prices vs interest rates, inflation and incomes")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Directory overrides and switches shared by every job.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Directory holding the raw downloads.
    #[arg(long, global = true)]
    pub raw_dir: Option<PathBuf>,

    /// Directory for cleaned quarterly/annual series.
    #[arg(long, global = true)]
    pub clean_dir: Option<PathBuf>,

    /// Directory for aggregated and analysed datasets.
    #[arg(long, global = true)]
    pub processed_dir: Option<PathBuf>,

    /// Directory for PNG charts.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Skip chart rendering.
    #[arg(long, global = true, default_value_t = false)]
    pub no_plot: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Daily bank rate -> quarterly averages from 2011.
    CleanBankRate,
    /// Raw CPI export -> quarterly averages.
    CleanCpi,
    /// Monthly average house price -> quarterly averages from 2011.
    CleanHousePrice,
    /// Raw real house price / salary export -> Year, Real_House_Price, Real_Median_Salary.
    CleanRealPriceSalary,
    /// Quarterly bank rate -> yearly averages.
    AggregateBankRate,
    /// Price-paid transactions -> yearly price standard deviation and count.
    AggregateVolatility(VolatilityArgs),
    /// Nominal vs CPI-deflated quarterly house prices.
    Deflate(DeflateArgs),
    /// Linear trend fit with hold-out RMSE and a forecast.
    Forecast(ForecastArgs),
    /// House price and bank rate on one timeline.
    Timeline,
    /// Quarterly house price growth vs bank rate, with Pearson correlation.
    QuarterlyChanges,
    /// Real house price / real median salary per year.
    Affordability,
    /// Years of median salary needed to buy, by age group and gender.
    AffordabilityByAge,
    /// Chart the yearly price volatility.
    PlotVolatility,
    /// Yearly price volatility vs yearly bank rate, with Pearson correlation.
    VolatilityVsRate,
}

#[derive(Debug, Args, Clone)]
pub struct VolatilityArgs {
    /// Price-paid CSV (defaults to `price_paid_records.csv` in the raw directory).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Records read per chunk.
    #[arg(long, default_value_t = CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Debug, Args, Clone, Default)]
pub struct DeflateArgs {
    /// Year of the CPI base quarter (defaults to the first shared quarter).
    #[arg(long, requires = "base_quarter")]
    pub base_year: Option<i32>,

    /// Quarter of the CPI base period (`Q1`..`Q4` or `1`..`4`).
    #[arg(long, requires = "base_year")]
    pub base_quarter: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Trailing quarters held out for the RMSE check (0 trains on everything).
    #[arg(long, default_value_t = DEFAULT_TEST_QUARTERS)]
    pub test_quarters: usize,

    /// Quarters to forecast past the last observation.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,
}
