use std::fs;
use std::path::Path;

use tempfile::TempDir;

use uk_housing_trends::app::{execute, pipeline};
use uk_housing_trends::cli::{Command, ForecastArgs};
use uk_housing_trends::config::PathConfig;
use uk_housing_trends::domain::{BasePeriod, Quarter, QuarterKey};
use uk_housing_trends::error::ErrorKind;
use uk_housing_trends::io::model::read_forecast_json;
use uk_housing_trends::plot::NullRenderer;

fn workspace() -> (TempDir, PathConfig) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let paths = PathConfig::with_dirs(root.join("raw"), root.join("clean"), root.join("processed"), root.join("out"));
    for d in [&paths.raw_dir, &paths.clean_dir] {
        fs::create_dir_all(d).unwrap();
    }
    (dir, paths)
}

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn quarterly_csv(column: &str, start_year: i32, values: &[f64], numeric_quarter: bool) -> String {
    let mut out = format!("Year,Quarter,{column}\n");
    for (i, v) in values.iter().enumerate() {
        let year = start_year + (i / 4) as i32;
        let q = i % 4 + 1;
        if numeric_quarter {
            out.push_str(&format!("{year},{q},{v}\n"));
        } else {
            out.push_str(&format!("{year},Q{q},{v}\n"));
        }
    }
    out
}

#[test]
fn deflate_job_anchors_first_shared_quarter() {
    let (_dir, paths) = workspace();
    write(
        &paths.clean_house_price(),
        &quarterly_csv("UK_Average_House_Price", 2013, &[200_000.0, 210_000.0, 220_000.0, 230_000.0], false),
    );
    // CPI starts one quarter earlier and ends one quarter earlier.
    write(
        &paths.clean_cpi(),
        "Year,Quarter,CPI_Quarterly_Avg\n2012,4,99\n2013,1,100\n2013,2,105\n2013,3,110\n",
    );

    let deflated = pipeline::run_deflate(&paths, BasePeriod::FirstRow, &NullRenderer).unwrap();
    assert_eq!(deflated.frame.len(), 3);
    assert_eq!(deflated.cpi_base, 100.0);

    let nominal = deflated.nominal().unwrap();
    let real = deflated.real().unwrap();
    assert_eq!(real[0], nominal[0]);
    assert!((real[1] - 210_000.0 * 100.0 / 105.0).abs() < 1e-6);
    assert!((real[2] - 220_000.0 * 100.0 / 110.0).abs() < 1e-6);

    let csv = fs::read_to_string(paths.deflated_prices()).unwrap();
    let header = csv.lines().next().unwrap();
    assert_eq!(
        header,
        "Year,Quarter,UK_Average_House_Price,CPI_Quarterly_Avg,CPI_Base,Real_House_Price,t,Year_Quarter"
    );
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn deflate_job_with_explicit_base() {
    let (_dir, paths) = workspace();
    write(
        &paths.clean_house_price(),
        &quarterly_csv("UK_Average_House_Price", 2013, &[100.0, 100.0, 100.0], false),
    );
    write(&paths.clean_cpi(), &quarterly_csv("CPI_Quarterly_Avg", 2013, &[100.0, 105.0, 110.0], true));

    let base = BasePeriod::Quarter(QuarterKey::new(2013, Quarter::Q3));
    let deflated = pipeline::run_deflate(&paths, base, &NullRenderer).unwrap();
    assert_eq!(deflated.base_row, 2);
    assert_eq!(deflated.cpi_base, 110.0);
    assert!((deflated.real().unwrap()[0] - 110.0).abs() < 1e-9);
}

#[test]
fn zero_cpi_fails_before_writing() {
    let (_dir, paths) = workspace();
    write(
        &paths.clean_house_price(),
        &quarterly_csv("UK_Average_House_Price", 2013, &[1.0, 2.0, 3.0], false),
    );
    write(&paths.clean_cpi(), &quarterly_csv("CPI_Quarterly_Avg", 2013, &[100.0, 0.0, 110.0], true));

    let err = pipeline::run_deflate(&paths, BasePeriod::FirstRow, &NullRenderer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCpi);
    assert_eq!(err.exit_code(), 4);
    assert!(!paths.deflated_prices().exists());
}

#[test]
fn bad_quarter_label_is_fatal() {
    let (_dir, paths) = workspace();
    write(
        &paths.clean_house_price(),
        "Year,Quarter,UK_Average_House_Price\n2013,Q1,1\n2013,Q5,2\n",
    );
    write(&paths.clean_cpi(), &quarterly_csv("CPI_Quarterly_Avg", 2013, &[100.0, 105.0], true));

    let err = pipeline::run_deflate(&paths, BasePeriod::FirstRow, &NullRenderer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidQuarter);
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn forecast_job_writes_model() {
    let (_dir, paths) = workspace();
    let values: Vec<f64> = (0..20).map(|i| 150_000.0 + 1_000.0 * i as f64).collect();
    write(&paths.clean_house_price(), &quarterly_csv("UK_Average_House_Price", 2011, &values, false));

    execute(
        Command::Forecast(ForecastArgs {
            test_quarters: 8,
            horizon: 8,
        }),
        &paths,
        &NullRenderer,
    )
    .unwrap();

    let model = read_forecast_json(&paths.forecast_model()).unwrap();
    assert_eq!(model.train_rows, 12);
    assert_eq!(model.test_rows, 8);
    assert!(model.test_rmse.unwrap() < 1e-3);
    assert!((model.model.slope - 1_000.0).abs() < 1e-6);

    // 2015 Q4 is the last observation.
    let t_last = 2015 * 4 + 3;
    let ts: Vec<i64> = model.forecast.iter().map(|p| p.t).collect();
    assert_eq!(ts, ((t_last + 1)..=(t_last + 8)).collect::<Vec<_>>());
}

#[test]
fn forecast_with_too_little_training_data() {
    let (_dir, paths) = workspace();
    write(
        &paths.clean_house_price(),
        &quarterly_csv("UK_Average_House_Price", 2011, &[1.0, 2.0, 3.0], false),
    );
    let err = pipeline::run_forecast(&paths, 2, 8, &NullRenderer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[test]
fn cleaned_bank_rate_feeds_timeline_and_changes() {
    let (_dir, paths) = workspace();
    write(
        &paths.raw_bank_rate(),
        "Date,Bank Rate\n\
         15 Dec 2010,0.5\n\
         03 Jan 2012,0.5\n\
         01 Apr 2012,1.0\n\
         01 Jul 2012,2.0\n\
         01 Aug 2012,2.0\n\
         01 Oct 2012,3.0\n\
         not a date,9.9\n",
    );
    let clean = pipeline::run_clean_bank_rate(&paths).unwrap();
    assert_eq!(clean.rows_saved, 4);
    assert_eq!(clean.rows_dropped, 1);

    write(
        &paths.clean_house_price(),
        &quarterly_csv("UK_Average_House_Price", 2012, &[100.0, 110.0, 99.0, 99.0, 120.0], false),
    );

    let frame = pipeline::run_timeline(&paths, &NullRenderer).unwrap();
    assert_eq!(frame.len(), 4);
    assert!(paths.timeline_data().exists());

    let changes = pipeline::run_quarterly_changes(&paths, &NullRenderer).unwrap();
    assert_eq!(changes.rows.len(), 3);
    assert_eq!(changes.correlation.n, 3);
    let csv = fs::read_to_string(paths.quarterly_changes()).unwrap();
    assert!(csv.starts_with(
        "Year,Quarter,Bank_Rate_Quarterly_Avg,UK_Average_House_Price,House_Price_Pct_Change\n2012,Q2,1.0,110.0,"
    ));
}

#[test]
fn volatility_chain_from_price_paid_to_correlation() {
    let (_dir, paths) = workspace();
    write(
        &paths.price_paid,
        "Transaction unique identifier,Price,Date of Transfer\n\
         a,100000,2010-01-05 00:00\n\
         b,110000,2010-06-05 00:00\n\
         c,100000,2011-01-05 00:00\n\
         d,130000,2011-06-05 00:00\n\
         e,100000,2012-01-05 00:00\n\
         f,160000,2012-06-05 00:00\n\
         g,90000,2013-03-01 00:00\n",
    );
    let vol = pipeline::run_aggregate_volatility(&paths, &paths.price_paid, 3).unwrap();
    assert_eq!(vol.len(), 4);
    assert_eq!(vol[3].price_std, None);

    write(
        &paths.clean_bank_rate(),
        "Year,Quarter,Bank_Rate_Quarterly_Avg\n\
         2010,Q1,0.5\n2010,Q2,0.5\n2011,Q1,1.0\n2011,Q2,1.0\n2012,Q1,1.5\n2013,Q1,2.0\n",
    );
    let yearly = pipeline::run_aggregate_bank_rate(&paths).unwrap();
    assert_eq!(yearly.len(), 4);

    let result = pipeline::run_volatility_vs_rate(&paths, &NullRenderer).unwrap();
    assert_eq!(result.rows.len(), 3);
    assert!(result.correlation.r > 0.99);
    assert!(paths.volatility_vs_rate().exists());

    let plotted = pipeline::run_plot_volatility(&paths, &NullRenderer).unwrap();
    assert_eq!(plotted.len(), 4);
}

#[test]
fn affordability_jobs() {
    let (_dir, paths) = workspace();
    write(
        &paths.clean_price_salary(),
        "Year,Real_House_Price,Real_Median_Salary\n2000,150000,\n2001,300000,30000\n2002,330000,30000\n",
    );
    write(
        &paths.raw_income_by_age(),
        "Age,Median salary (£),Sex\n18-21,16500,Male\n22-29,33000,Female\n",
    );

    execute(Command::Affordability, &paths, &NullRenderer).unwrap();
    let csv = fs::read_to_string(paths.affordability()).unwrap();
    assert_eq!(
        csv,
        "Year,Real_House_Price,Real_Median_Salary,Affordability_Ratio\n\
         2001,300000.0,30000.0,10.0\n\
         2002,330000.0,30000.0,11.0\n"
    );

    let run = pipeline::run_affordability_by_age(&paths, &NullRenderer).unwrap();
    assert_eq!(run.latest.year, 2002);
    assert_eq!(run.rows.len(), 2);
    assert_eq!(run.rows[0].years_of_income, 20.0);
    assert_eq!(run.rows[1].years_of_income, 10.0);
}

#[test]
fn missing_input_is_an_io_error() {
    let (_dir, paths) = workspace();
    let err = execute(Command::Timeline, &paths, &NullRenderer).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
