//! One function per job.
//!
//! Each job reads its inputs from [`PathConfig`], runs the library code,
//! writes its CSV/JSON outputs, hands charts to the injected renderer and
//! returns what the terminal summary needs. Printing stays in `app`.

use std::path::{Path, PathBuf};

use log::info;

use crate::aggregate::{
    BANK_RATE_YEARLY_COLUMN, BankRateYearlyRow, YearlyVolatilityRow, aggregate_bank_rate_yearly,
    aggregate_price_volatility_chunked,
};
use crate::align::{AlignedFrame, align};
use crate::analysis::{
    AffordabilityRow, AgeAffordabilityRow, QuarterlyChanges, VolatilityVsRate, affordability_by_age,
    affordability_ratios, latest_real_price, quarterly_changes, timeline, volatility_vs_rate,
};
use crate::clean::{
    BANK_RATE_COLUMN, CPI_COLUMN, CleanOutcome, HOUSE_PRICE_COLUMN, clean_bank_rate, clean_cpi, clean_house_price,
    clean_price_salary,
};
use crate::config::{PathConfig, charts};
use crate::deflate::{DeflatedSeries, REAL_PRICE_COLUMN, deflate};
use crate::domain::{AnnualPriceSalary, BasePeriod, TimePoint, YearlyVolatility};
use crate::error::{AppError, ErrorKind};
use crate::fit::{TrendFit, fit_trend, forecast};
use crate::io::export::{write_aligned_frame, write_csv};
use crate::io::ingest::{
    load_income_groups, load_price_salary, load_quarterly_series, load_yearly_values, load_yearly_volatility,
};
use crate::io::model::{ForecastFile, write_forecast_json};
use crate::plot::{BLACK, BLUE, Chart, ChartRenderer, ORANGE, PALETTE, RED};

/// Row counts and destination of a cleaning job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRun {
    pub job: &'static str,
    pub rows_read: usize,
    pub rows_saved: usize,
    pub rows_dropped: usize,
    pub output: PathBuf,
}

impl CleanRun {
    fn from_outcome<T>(job: &'static str, outcome: CleanOutcome<T>) -> Self {
        Self {
            job,
            rows_read: outcome.rows_read,
            rows_saved: outcome.rows.len(),
            rows_dropped: outcome.rows_dropped,
            output: outcome.output,
        }
    }
}

pub fn run_clean_bank_rate(paths: &PathConfig) -> Result<CleanRun, AppError> {
    let outcome = clean_bank_rate(&paths.raw_bank_rate(), &paths.clean_bank_rate())?;
    Ok(CleanRun::from_outcome("Bank rate (quarterly)", outcome))
}

pub fn run_clean_cpi(paths: &PathConfig) -> Result<CleanRun, AppError> {
    let outcome = clean_cpi(&paths.raw_cpi(), &paths.clean_cpi())?;
    Ok(CleanRun::from_outcome("CPI (quarterly)", outcome))
}

pub fn run_clean_house_price(paths: &PathConfig) -> Result<CleanRun, AppError> {
    let outcome = clean_house_price(&paths.raw_house_price(), &paths.clean_house_price())?;
    Ok(CleanRun::from_outcome("UK average house price (quarterly)", outcome))
}

pub fn run_clean_price_salary(paths: &PathConfig) -> Result<CleanRun, AppError> {
    let outcome = clean_price_salary(&paths.raw_price_salary(), &paths.clean_price_salary())?;
    Ok(CleanRun::from_outcome("Real house price and salary (annual)", outcome))
}

pub fn run_aggregate_bank_rate(paths: &PathConfig) -> Result<Vec<BankRateYearlyRow>, AppError> {
    aggregate_bank_rate_yearly(&paths.clean_bank_rate(), &paths.bank_rate_yearly())
}

pub fn run_aggregate_volatility(
    paths: &PathConfig,
    input: &Path,
    chunk_size: usize,
) -> Result<Vec<YearlyVolatilityRow>, AppError> {
    aggregate_price_volatility_chunked(input, &paths.yearly_volatility(), chunk_size)
}

/// House prices joined with CPI and rescaled to the base quarter.
pub fn run_deflate(
    paths: &PathConfig,
    base: BasePeriod,
    renderer: &dyn ChartRenderer,
) -> Result<DeflatedSeries, AppError> {
    let house = load_quarterly_series(&paths.clean_house_price(), HOUSE_PRICE_COLUMN)?.data;
    let cpi = load_quarterly_series(&paths.clean_cpi(), CPI_COLUMN)?.data;

    let frame = align(&[&house, &cpi])?;
    let deflated = deflate(&frame, HOUSE_PRICE_COLUMN, CPI_COLUMN, REAL_PRICE_COLUMN, base)?;

    let output = paths.deflated_prices();
    write_aligned_frame(&output, &deflated.frame)?;
    info!("deflated prices written to {}", output.display());

    let chart = Chart::new("UK House Prices: Nominal vs Real", "Year", "Price (£)")
        .line("Nominal", frame_points(&deflated.frame, &deflated.nominal_column)?, BLUE)
        .line("Real", frame_points(&deflated.frame, &deflated.real_column)?, ORANGE);
    renderer.render(&chart, &paths.chart(charts::NOMINAL_VS_REAL))?;

    Ok(deflated)
}

#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub series: String,
    pub fit: TrendFit,
    pub forecast: Vec<TimePoint>,
    pub model_path: PathBuf,
}

/// Linear trend on the nominal quarterly house price.
pub fn run_forecast(
    paths: &PathConfig,
    test_quarters: usize,
    horizon: usize,
    renderer: &dyn ChartRenderer,
) -> Result<ForecastRun, AppError> {
    let house = load_quarterly_series(&paths.clean_house_price(), HOUSE_PRICE_COLUMN)?.data;
    let points = house.time_indexed();

    let fit = fit_trend(&points, test_quarters)?;
    let t_last = fit
        .t_last()
        .ok_or_else(|| AppError::new(ErrorKind::EmptyData, "House price series is empty."))?;
    let ahead = forecast(&fit.model, t_last, horizon);

    let model_path = paths.forecast_model();
    write_forecast_json(&model_path, &ForecastFile::new(house.name(), &fit, &ahead))?;
    info!("forecast model written to {}", model_path.display());

    let fitted: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (decimal_year(p.t), fit.model.predict(p.t as f64)))
        .collect();
    let mut chart = Chart::new("UK House Price: Linear Trend Forecast", "Year", "Price (£)")
        .line("Observed", time_points(&points), BLACK)
        .line("Fitted", fitted, BLUE)
        .line("Forecast", time_points(&ahead), RED);
    if !fit.test.is_empty() {
        chart = chart.scatter("Hold-out", time_points(&fit.test), ORANGE);
    }
    renderer.render(&chart, &paths.chart(charts::FORECAST))?;

    Ok(ForecastRun {
        series: house.name().to_string(),
        fit,
        forecast: ahead,
        model_path,
    })
}

/// House price and bank rate over the quarters both cover.
pub fn run_timeline(paths: &PathConfig, renderer: &dyn ChartRenderer) -> Result<AlignedFrame, AppError> {
    let bank = load_quarterly_series(&paths.clean_bank_rate(), BANK_RATE_COLUMN)?.data;
    let house = load_quarterly_series(&paths.clean_house_price(), HOUSE_PRICE_COLUMN)?.data;

    let frame = timeline(&bank, &house)?;
    write_aligned_frame(&paths.timeline_data(), &frame)?;

    let chart = Chart::new("UK House Prices vs Bank of England Base Rate", "Year", "Price (£)")
        .line("House price", frame_points(&frame, HOUSE_PRICE_COLUMN)?, BLUE)
        .secondary_line("Bank rate", frame_points(&frame, BANK_RATE_COLUMN)?, RED);
    renderer.render(&chart, &paths.chart(charts::TIMELINE))?;

    Ok(frame)
}

pub fn run_quarterly_changes(paths: &PathConfig, renderer: &dyn ChartRenderer) -> Result<QuarterlyChanges, AppError> {
    let bank = load_quarterly_series(&paths.clean_bank_rate(), BANK_RATE_COLUMN)?.data;
    let house = load_quarterly_series(&paths.clean_house_price(), HOUSE_PRICE_COLUMN)?.data;

    let changes = quarterly_changes(&bank, &house)?;
    write_csv(&paths.quarterly_changes(), &changes.rows)?;

    let points = changes.rows.iter().map(|r| (r.bank_rate, r.pct_change)).collect();
    let chart = Chart::new(
        "House Price Growth vs Bank of England Base Rate",
        "Bank rate (%)",
        "Quarterly house price change (%)",
    )
    .scatter("Quarter", points, BLACK);
    renderer.render(&chart, &paths.chart(charts::GROWTH_VS_RATE))?;

    Ok(changes)
}

pub fn run_affordability(paths: &PathConfig, renderer: &dyn ChartRenderer) -> Result<Vec<AffordabilityRow>, AppError> {
    let data = load_price_salary(&paths.clean_price_salary())?.data;
    let rows = affordability_ratios(&data)?;
    write_csv(&paths.affordability(), &rows)?;

    let points = rows.iter().map(|r| (f64::from(r.year), r.ratio)).collect();
    let chart = Chart::new("UK Housing Affordability (Real Terms)", "Year", "House price / median salary")
        .line("Affordability", points, BLACK);
    renderer.render(&chart, &paths.chart(charts::AFFORDABILITY))?;

    Ok(rows)
}

#[derive(Debug, Clone)]
pub struct AgeAffordabilityRun {
    pub latest: AnnualPriceSalary,
    pub rows: Vec<AgeAffordabilityRow>,
}

pub fn run_affordability_by_age(
    paths: &PathConfig,
    renderer: &dyn ChartRenderer,
) -> Result<AgeAffordabilityRun, AppError> {
    let latest = latest_real_price(&load_price_salary(&paths.clean_price_salary())?.data)?;
    let groups = load_income_groups(&paths.raw_income_by_age())?.data;
    let rows = affordability_by_age(&groups, latest.real_house_price)?;
    write_csv(&paths.affordability_by_age(), &rows)?;

    // Age groups are categorical: plot them at their position of first appearance.
    let mut ages: Vec<&str> = Vec::new();
    let mut genders: Vec<&str> = Vec::new();
    for r in &rows {
        if !ages.contains(&r.age_group.as_str()) {
            ages.push(&r.age_group);
        }
        if !genders.contains(&r.gender.as_str()) {
            genders.push(&r.gender);
        }
    }
    let mut chart = Chart::new(
        "Housing Affordability by Age Group and Gender",
        "Age group",
        "Years of income required",
    );
    for (i, gender) in genders.iter().enumerate() {
        let points = rows
            .iter()
            .filter(|r| r.gender == *gender)
            .filter_map(|r| {
                let x = ages.iter().position(|a| *a == r.age_group)?;
                Some((x as f64, r.years_of_income))
            })
            .collect();
        chart = chart.line(*gender, points, PALETTE[i % PALETTE.len()]);
    }
    renderer.render(&chart, &paths.chart(charts::AFFORDABILITY_BY_AGE))?;

    Ok(AgeAffordabilityRun { latest, rows })
}

pub fn run_plot_volatility(paths: &PathConfig, renderer: &dyn ChartRenderer) -> Result<Vec<YearlyVolatility>, AppError> {
    let data = load_yearly_volatility(&paths.yearly_volatility())?.data;
    let points: Vec<(f64, f64)> = data
        .iter()
        .filter_map(|v| v.price_std.map(|std| (f64::from(v.year), std)))
        .collect();
    if points.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyData,
            "No year has a price standard deviation to plot.",
        ));
    }

    let chart = Chart::new("House Price Volatility Over Time", "Year", "Std dev of price (£)")
        .line("Price_STD", points, BLACK);
    renderer.render(&chart, &paths.chart(charts::VOLATILITY))?;

    Ok(data)
}

pub fn run_volatility_vs_rate(paths: &PathConfig, renderer: &dyn ChartRenderer) -> Result<VolatilityVsRate, AppError> {
    let volatility = load_yearly_volatility(&paths.yearly_volatility())?.data;
    let rates = load_yearly_values(&paths.bank_rate_yearly(), BANK_RATE_YEARLY_COLUMN)?.data;

    let result = volatility_vs_rate(&volatility, &rates)?;
    write_csv(&paths.volatility_vs_rate(), &result.rows)?;

    let points = result.rows.iter().map(|r| (r.bank_rate, r.price_std)).collect();
    let chart = Chart::new(
        "House Price Volatility vs Interest Rate",
        "Bank rate (yearly avg, %)",
        "Std dev of price (£)",
    )
    .scatter("Year", points, BLACK);
    renderer.render(&chart, &paths.chart(charts::VOLATILITY_VS_RATE))?;

    Ok(result)
}

/// `t / 4` is the year with the quarter as a fraction (`2013 Q3` -> `2013.5`).
fn decimal_year(t: i64) -> f64 {
    t as f64 / 4.0
}

fn time_points(points: &[TimePoint]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (decimal_year(p.t), p.value)).collect()
}

fn frame_points(frame: &AlignedFrame, column: &str) -> Result<Vec<(f64, f64)>, AppError> {
    let values = frame.column(column)?;
    Ok(frame
        .rows()
        .iter()
        .zip(values)
        .map(|(row, v)| (decimal_year(row.t), v))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_year_places_quarters() {
        assert_eq!(decimal_year(2013 * 4), 2013.0);
        assert_eq!(decimal_year(2013 * 4 + 2), 2013.5);
    }
}
