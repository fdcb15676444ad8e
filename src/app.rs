//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging and maps errors to exit codes; this
//! module parses the CLI, resolves paths and the chart renderer, runs the
//! selected job and prints its summary.

use clap::Parser;

use crate::cli::{Cli, Command, DeflateArgs, GlobalArgs};
use crate::config::PathConfig;
use crate::domain::{BasePeriod, Quarter, QuarterKey};
use crate::error::AppError;
use crate::plot::{ChartRenderer, NullRenderer, PngRenderer};
use crate::report;

pub mod pipeline;

/// Entry point for the `housing` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let paths = path_config_from_args(PathConfig::from_env(), &cli.global);
    let renderer: Box<dyn ChartRenderer> = if cli.global.no_plot {
        Box::new(NullRenderer)
    } else {
        Box::new(PngRenderer::default())
    };

    execute(cli.command, &paths, renderer.as_ref())
}

/// Run one job against `paths` and print its summary.
pub fn execute(command: Command, paths: &PathConfig, renderer: &dyn ChartRenderer) -> Result<(), AppError> {
    match command {
        Command::CleanBankRate => print_clean(pipeline::run_clean_bank_rate(paths)?),
        Command::CleanCpi => print_clean(pipeline::run_clean_cpi(paths)?),
        Command::CleanHousePrice => print_clean(pipeline::run_clean_house_price(paths)?),
        Command::CleanRealPriceSalary => print_clean(pipeline::run_clean_price_salary(paths)?),
        Command::AggregateBankRate => {
            let rows = pipeline::run_aggregate_bank_rate(paths)?;
            println!("{}", report::format_bank_rate_yearly(&rows, &paths.bank_rate_yearly()));
        }
        Command::AggregateVolatility(args) => {
            let input = args.input.unwrap_or_else(|| paths.price_paid.clone());
            let rows = pipeline::run_aggregate_volatility(paths, &input, args.chunk_size)?;
            println!("{}", report::format_yearly_volatility(&rows, &paths.yearly_volatility()));
        }
        Command::Deflate(args) => {
            let deflated = pipeline::run_deflate(paths, base_period_from_args(&args)?, renderer)?;
            println!("{}", report::format_deflate_summary(&deflated, &paths.deflated_prices()));
        }
        Command::Forecast(args) => {
            let run = pipeline::run_forecast(paths, args.test_quarters, args.horizon, renderer)?;
            println!("{}", report::format_forecast_summary(&run.series, &run.fit, &run.forecast));
        }
        Command::Timeline => {
            let frame = pipeline::run_timeline(paths, renderer)?;
            if let (Some(first), Some(last)) = (frame.rows().first(), frame.rows().last()) {
                println!(
                    "Timeline: {} quarters ({} .. {})",
                    frame.len(),
                    first.key.label(),
                    last.key.label()
                );
            }
        }
        Command::QuarterlyChanges => {
            let changes = pipeline::run_quarterly_changes(paths, renderer)?;
            println!(
                "{}",
                report::format_correlation("House price growth vs bank rate", &changes.correlation)
            );
        }
        Command::Affordability => {
            let rows = pipeline::run_affordability(paths, renderer)?;
            println!("{}", report::format_affordability(&rows));
        }
        Command::AffordabilityByAge => {
            let run = pipeline::run_affordability_by_age(paths, renderer)?;
            println!("{}", report::format_age_affordability(&run.latest, &run.rows));
        }
        Command::PlotVolatility => {
            let data = pipeline::run_plot_volatility(paths, renderer)?;
            println!("Plotted price volatility for {} years.", data.len());
        }
        Command::VolatilityVsRate => {
            let result = pipeline::run_volatility_vs_rate(paths, renderer)?;
            println!(
                "{}",
                report::format_correlation("House price volatility vs interest rate", &result.correlation)
            );
        }
    }
    Ok(())
}

fn print_clean(run: pipeline::CleanRun) {
    println!(
        "{}",
        report::format_clean_summary(run.job, run.rows_read, run.rows_saved, run.rows_dropped, &run.output)
    );
}

/// Apply CLI directory flags on top of the environment-derived config.
pub fn path_config_from_args(mut paths: PathConfig, args: &GlobalArgs) -> PathConfig {
    if let Some(dir) = &args.raw_dir {
        // Only follow the raw directory if the price-paid file was not set explicitly.
        if paths.price_paid == paths.raw_dir.join("price_paid_records.csv") {
            paths.price_paid = dir.join("price_paid_records.csv");
        }
        paths.raw_dir = dir.clone();
    }
    if let Some(dir) = &args.clean_dir {
        paths.clean_dir = dir.clone();
    }
    if let Some(dir) = &args.processed_dir {
        paths.processed_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        paths.output_dir = dir.clone();
    }
    paths
}

pub fn base_period_from_args(args: &DeflateArgs) -> Result<BasePeriod, AppError> {
    match (args.base_year, args.base_quarter.as_deref()) {
        (Some(year), Some(quarter)) => Ok(BasePeriod::Quarter(QuarterKey::new(year, Quarter::parse(quarter)?))),
        _ => Ok(BasePeriod::FirstRow),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn cli_dirs_override_config() {
        let args = GlobalArgs {
            raw_dir: Some(PathBuf::from("r")),
            output_dir: Some(PathBuf::from("o")),
            ..GlobalArgs::default()
        };
        let paths = path_config_from_args(PathConfig::default(), &args);
        assert_eq!(paths.raw_dir, PathBuf::from("r"));
        assert_eq!(paths.price_paid, PathBuf::from("r/price_paid_records.csv"));
        assert_eq!(paths.output_dir, PathBuf::from("o"));
        assert_eq!(paths.clean_dir, PathBuf::from("data/clean"));
    }

    #[test]
    fn explicit_price_paid_survives_raw_dir_flag() {
        let mut config = PathConfig::default();
        config.price_paid = PathBuf::from("/big/pp.csv");
        let args = GlobalArgs {
            raw_dir: Some(PathBuf::from("r")),
            ..GlobalArgs::default()
        };
        assert_eq!(path_config_from_args(config, &args).price_paid, PathBuf::from("/big/pp.csv"));
    }

    #[test]
    fn base_period_parsing() {
        assert_eq!(base_period_from_args(&DeflateArgs::default()).unwrap(), BasePeriod::FirstRow);

        let args = DeflateArgs {
            base_year: Some(2015),
            base_quarter: Some("q2".to_string()),
        };
        assert_eq!(
            base_period_from_args(&args).unwrap(),
            BasePeriod::Quarter(QuarterKey::new(2015, Quarter::Q2))
        );

        let bad = DeflateArgs {
            base_year: Some(2015),
            base_quarter: Some("Q7".to_string()),
        };
        assert_eq!(base_period_from_args(&bad).unwrap_err().kind(), ErrorKind::InvalidQuarter);
    }
}
