//! Formatted terminal output.
//!
//! Formatting lives here so the jobs stay free of presentation details and
//! output changes are localized.

use std::path::Path;

use crate::aggregate::{BankRateYearlyRow, YearlyVolatilityRow};
use crate::analysis::{AffordabilityRow, AgeAffordabilityRow};
use crate::deflate::DeflatedSeries;
use crate::domain::{AnnualPriceSalary, TimePoint};
use crate::fit::TrendFit;
use crate::math::Correlation;

/// Rows shown by the `head`-style tables.
pub const HEAD_ROWS: usize = 5;

pub fn format_clean_summary(job: &str, rows_read: usize, rows_saved: usize, rows_dropped: usize, output: &Path) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {job} ===\n"));
    out.push_str(&format!("Rows read: {rows_read} | dropped: {rows_dropped}\n"));
    out.push_str(&format!("Rows saved: {rows_saved}\n"));
    out.push_str(&format!("Saved to: {}\n", output.display()));
    out
}

/// First rows of the deflated frame: nominal price, CPI, real price.
pub fn format_deflate_summary(deflated: &DeflatedSeries, output: &Path) -> String {
    let mut out = String::new();
    let base = &deflated.frame.rows()[deflated.base_row];
    out.push_str("=== Nominal vs real house prices ===\n");
    out.push_str(&format!(
        "Quarters: {} | CPI base: {:.2} ({})\n\n",
        deflated.frame.len(),
        deflated.cpi_base,
        base.key.label()
    ));

    let nominal = deflated.frame.column_index(&deflated.nominal_column).ok();
    let real = deflated.frame.column_index(&deflated.real_column).ok();
    let cpi = deflated.frame.column_index(&deflated.cpi_column).ok();

    push_row(&mut out, &format!("{:<6} {:<7} {:>14} {:>10} {:>14}", "Year", "Quarter", "Nominal", "CPI", "Real"));
    push_row(&mut out, &format!("{:-<6} {:-<7} {:-<14} {:-<10} {:-<14}", "", "", "", "", ""));
    for row in deflated.frame.rows().iter().take(HEAD_ROWS) {
        let value = |idx: Option<usize>| idx.and_then(|i| row.values.get(i).copied()).unwrap_or(f64::NAN);
        push_row(
            &mut out,
            &format!(
                "{:<6} {:<7} {:>14.2} {:>10.2} {:>14.2}",
                row.key.year,
                row.key.quarter,
                value(nominal),
                value(cpi),
                value(real)
            ),
        );
    }
    out.push_str(&format!("\nSaved to: {}\n", output.display()));
    out
}

pub fn format_forecast_summary(series: &str, fit: &TrendFit, forecast: &[TimePoint]) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Linear trend forecast: {series} ===\n"));
    out.push_str(&format!(
        "Train: {} quarters | Test: {} quarters\n",
        fit.train.len(),
        fit.test.len()
    ));
    out.push_str(&format!(
        "Model: value = {:.4} * t + {:.4}\n",
        fit.model.slope, fit.model.intercept
    ));
    match fit.test_rmse {
        Some(rmse) => out.push_str(&format!("Test RMSE: £{}\n", fmt_thousands(rmse))),
        None => out.push_str("Test RMSE: n/a (no hold-out)\n"),
    }

    out.push_str("\nForecast:\n");
    push_row(&mut out, &format!("{:>8} {:>14}", "t", "value"));
    push_row(&mut out, &format!("{:->8} {:->14}", "", ""));
    for p in forecast {
        push_row(&mut out, &format!("{:>8} {:>14}", p.t, fmt_thousands(p.value)));
    }
    out
}

pub fn format_correlation(title: &str, c: &Correlation) -> String {
    format!("=== {title} ===\nPairs: {}\nPearson r: {:.3}\np-value: {:.4}\n", c.n, c.r, c.p_value)
}

pub fn format_affordability(rows: &[AffordabilityRow]) -> String {
    let mut out = String::new();
    out.push_str("=== UK housing affordability (real terms) ===\n");
    push_row(
        &mut out,
        &format!("{:<6} {:>16} {:>18} {:>10}", "Year", "Real_House_Price", "Real_Median_Salary", "Ratio"),
    );
    push_row(&mut out, &format!("{:-<6} {:-<16} {:-<18} {:-<10}", "", "", "", ""));
    for r in rows.iter().take(HEAD_ROWS) {
        push_row(
            &mut out,
            &format!(
                "{:<6} {:>16.2} {:>18.2} {:>10.2}",
                r.year, r.real_house_price, r.real_median_salary, r.ratio
            ),
        );
    }
    if rows.len() > HEAD_ROWS {
        out.push_str(&format!("... {} more years\n", rows.len() - HEAD_ROWS));
    }
    out
}

pub fn format_age_affordability(latest: &AnnualPriceSalary, rows: &[AgeAffordabilityRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Latest real house price used: {:.2} ({})\n\n",
        latest.real_house_price, latest.year
    ));
    push_row(
        &mut out,
        &format!("{:<16} {:<10} {:>14} {:>8}", "Age_Group", "Gender", "Median_Salary", "Years"),
    );
    push_row(&mut out, &format!("{:-<16} {:-<10} {:-<14} {:-<8}", "", "", "", ""));
    for r in rows {
        push_row(
            &mut out,
            &format!(
                "{:<16} {:<10} {:>14.2} {:>8.2}",
                truncate(&r.age_group, 16),
                truncate(&r.gender, 10),
                r.median_salary,
                r.years_of_income
            ),
        );
    }
    out
}

pub fn format_bank_rate_yearly(rows: &[BankRateYearlyRow], output: &Path) -> String {
    let mut out = String::from("=== Yearly bank rate ===\n");
    for r in rows {
        out.push_str(&format!("{} {:>8.4}\n", r.year, r.rate));
    }
    out.push_str(&format!("Saved to: {}\n", output.display()));
    out
}

pub fn format_yearly_volatility(rows: &[YearlyVolatilityRow], output: &Path) -> String {
    let mut out = String::from("=== Yearly price volatility ===\n");
    push_row(&mut out, &format!("{:<6} {:>14} {:>12}", "Year", "Price_STD", "Count"));
    push_row(&mut out, &format!("{:-<6} {:-<14} {:-<12}", "", "", ""));
    for r in rows {
        let std = r.price_std.map(fmt_thousands).unwrap_or_else(|| "-".to_string());
        push_row(&mut out, &format!("{:<6} {:>14} {:>12}", r.year, std, r.transaction_count));
    }
    out.push_str(&format!("Saved to: {}\n", output.display()));
    out
}

/// Whole-unit value with `,` thousands separators, e.g. `12,345`.
pub fn fmt_thousands(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let rounded = v.round_ties_even();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn push_row(out: &mut String, row: &str) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
