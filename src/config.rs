//! Where every job reads and writes.
//!
//! Defaults mirror the project's `data/` layout. Directories can be moved with
//! environment variables (a `.env` file is honored) and then with CLI flags.
//! Jobs only ever see concrete paths from here.

use std::path::{Path, PathBuf};

use log::debug;

pub const ENV_RAW_DIR: &str = "HOUSING_RAW_DIR";
pub const ENV_CLEAN_DIR: &str = "HOUSING_CLEAN_DIR";
pub const ENV_PROCESSED_DIR: &str = "HOUSING_PROCESSED_DIR";
pub const ENV_OUTPUT_DIR: &str = "HOUSING_OUTPUT_DIR";
pub const ENV_PRICE_PAID_CSV: &str = "HOUSING_PRICE_PAID_CSV";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    pub raw_dir: PathBuf,
    pub clean_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Transaction-level price-paid file; lives outside the repo in practice.
    pub price_paid: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self::with_dirs("data/raw", "data/clean", "data/processed", "outputs")
    }
}

impl PathConfig {
    pub fn with_dirs(
        raw: impl Into<PathBuf>,
        clean: impl Into<PathBuf>,
        processed: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        let raw_dir = raw.into();
        Self {
            price_paid: raw_dir.join("price_paid_records.csv"),
            raw_dir,
            clean_dir: clean.into(),
            processed_dir: processed.into(),
            output_dir: output.into(),
        }
    }

    /// Defaults overridden by the process environment (after loading `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `HOUSING_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        if let Some(dir) = var(ENV_RAW_DIR) {
            config.price_paid = dir.join("price_paid_records.csv");
            config.raw_dir = dir;
        }
        if let Some(dir) = var(ENV_CLEAN_DIR) {
            config.clean_dir = dir;
        }
        if let Some(dir) = var(ENV_PROCESSED_DIR) {
            config.processed_dir = dir;
        }
        if let Some(dir) = var(ENV_OUTPUT_DIR) {
            config.output_dir = dir;
        }
        if let Some(file) = var(ENV_PRICE_PAID_CSV) {
            config.price_paid = file;
        }

        debug!("paths: {config:?}");
        config
    }

    /// Raw inputs.
    pub fn raw_bank_rate(&self) -> PathBuf {
        self.raw_dir.join("bank_rate.csv")
    }

    pub fn raw_cpi(&self) -> PathBuf {
        self.raw_dir.join("CPI_quarterly.csv")
    }

    pub fn raw_house_price(&self) -> PathBuf {
        self.raw_dir.join("uk_house_price_annual_average_price.csv")
    }

    pub fn raw_price_salary(&self) -> PathBuf {
        self.raw_dir.join("Average_UK_houseprices_and_salary.csv")
    }

    pub fn raw_income_by_age(&self) -> PathBuf {
        self.raw_dir.join("Income_by_age_and_gender.csv")
    }

    /// Cleaned quarterly / annual series.
    pub fn clean_bank_rate(&self) -> PathBuf {
        self.clean_dir.join("bank_rate_quarterly.csv")
    }

    pub fn clean_cpi(&self) -> PathBuf {
        self.clean_dir.join("cpi_quarterly_avg.csv")
    }

    pub fn clean_house_price(&self) -> PathBuf {
        self.clean_dir.join("uk_house_price_quarterly.csv")
    }

    pub fn clean_price_salary(&self) -> PathBuf {
        self.clean_dir.join("Average_UK_houseprices_and_salary.csv")
    }

    /// Aggregated and analysed datasets.
    pub fn bank_rate_yearly(&self) -> PathBuf {
        self.processed_dir.join("bank_rate_yearly_avg.csv")
    }

    pub fn yearly_volatility(&self) -> PathBuf {
        self.processed_dir.join("yearly_price_volatility.csv")
    }

    pub fn deflated_prices(&self) -> PathBuf {
        self.processed_dir.join("house_prices_with_cpi_real.csv")
    }

    pub fn forecast_model(&self) -> PathBuf {
        self.processed_dir.join("house_price_linear_forecast.json")
    }

    pub fn timeline_data(&self) -> PathBuf {
        self.processed_dir.join("house_price_vs_bank_rate_timeline.csv")
    }

    pub fn quarterly_changes(&self) -> PathBuf {
        self.processed_dir.join("house_price_growth_vs_bank_rate.csv")
    }

    pub fn affordability(&self) -> PathBuf {
        self.processed_dir.join("affordability_ratio.csv")
    }

    pub fn affordability_by_age(&self) -> PathBuf {
        self.processed_dir.join("affordability_by_age_and_gender.csv")
    }

    pub fn volatility_vs_rate(&self) -> PathBuf {
        self.processed_dir.join("volatility_vs_interest_rate.csv")
    }

    /// Charts.
    pub fn chart(&self, name: &str) -> PathBuf {
        self.output_dir.join(Path::new(name).with_extension("png"))
    }
}

/// Chart file stems under the output directory.
pub mod charts {
    pub const NOMINAL_VS_REAL: &str = "nominal_vs_real_house_prices";
    pub const FORECAST: &str = "house_price_linear_forecast";
    pub const TIMELINE: &str = "house_price_vs_bank_rate_timeline";
    pub const GROWTH_VS_RATE: &str = "house_price_growth_vs_bank_rate";
    pub const AFFORDABILITY: &str = "affordability_ratio_over_time";
    pub const AFFORDABILITY_BY_AGE: &str = "affordability_by_age_and_gender";
    pub const VOLATILITY: &str = "house_price_volatility_over_time";
    pub const VOLATILITY_VS_RATE: &str = "volatility_vs_interest_rate";
}
