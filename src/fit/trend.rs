//! Linear trend fitting and forecasting on the quarterly time axis.
//!
//! Given time-indexed points `(t_i, y_i)` sorted by `t` and a hold-out size `k`:
//! - the first `n - k` points are the training slice
//! - the last `k` points are the test slice
//!
//! We fit `y ≈ slope * t + intercept` on the training slice only, report the
//! RMSE on the test slice, and extrapolate the line past the last observed `t`.
//! The model is fit once; there is no refit on the test slice and no
//! seasonal term.

use log::info;
use nalgebra::{DMatrix, DVector};

use crate::domain::{LinearModel, TimePoint};
use crate::error::{AppError, ErrorKind};
use crate::math::{rmse, solve_least_squares};

/// Default number of trailing quarters held out for testing.
pub const DEFAULT_TEST_QUARTERS: usize = 8;
/// Default number of quarters to forecast.
pub const DEFAULT_HORIZON: usize = 8;

/// Output of a train/test trend fit.
#[derive(Debug, Clone)]
pub struct TrendFit {
    pub model: LinearModel,
    pub train: Vec<TimePoint>,
    pub test: Vec<TimePoint>,
    /// RMSE on the test slice; `None` when nothing was held out.
    pub test_rmse: Option<f64>,
}

impl TrendFit {
    /// Largest observed `t` across both slices.
    pub fn t_last(&self) -> Option<i64> {
        self.test.last().or(self.train.last()).map(|p| p.t)
    }
}

/// Ordinary least squares line through `points`.
///
/// Requires at least two distinct `t` values.
pub fn fit_line(points: &[TimePoint]) -> Result<LinearModel, AppError> {
    let distinct_t = count_distinct_t(points);
    if distinct_t < 2 {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!(
                "Linear trend needs at least 2 distinct time points, got {distinct_t} ({} rows).",
                points.len()
            ),
        ));
    }

    let n = points.len();
    let x = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { points[i].t as f64 });
    let y = DVector::from_iterator(n, points.iter().map(|p| p.value));

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::new(ErrorKind::Numeric, "Least squares solve failed for the linear trend."))?;

    Ok(LinearModel {
        slope: beta[1],
        intercept: beta[0],
    })
}

/// Fit on all but the last `test_quarters` points and score on the rest.
///
/// `points` must already be sorted by `t`.
pub fn fit_trend(points: &[TimePoint], test_quarters: usize) -> Result<TrendFit, AppError> {
    if test_quarters >= points.len() {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!(
                "Cannot hold out {test_quarters} quarters from a series of {} rows.",
                points.len()
            ),
        ));
    }

    let split = points.len() - test_quarters;
    let (train, test) = points.split_at(split);

    let model = fit_line(train)?;

    let test_rmse = if test.is_empty() {
        None
    } else {
        let actual: Vec<f64> = test.iter().map(|p| p.value).collect();
        let predicted: Vec<f64> = test.iter().map(|p| model.predict(p.t as f64)).collect();
        Some(rmse(&actual, &predicted)?)
    };

    info!(
        "fitted linear trend on {} rows (slope={:.4}, intercept={:.4}), held out {}",
        train.len(),
        model.slope,
        model.intercept,
        test.len()
    );

    Ok(TrendFit {
        model,
        train: train.to_vec(),
        test: test.to_vec(),
        test_rmse,
    })
}

/// Evaluate the line at the `n_future` quarters following `t_last`.
pub fn forecast(model: &LinearModel, t_last: i64, n_future: usize) -> Vec<TimePoint> {
    (1..=n_future as i64)
        .map(|step| {
            let t = t_last + step;
            TimePoint {
                t,
                value: model.predict(t as f64),
            }
        })
        .collect()
}

fn count_distinct_t(points: &[TimePoint]) -> usize {
    let mut ts: Vec<i64> = points.iter().map(|p| p.t).collect();
    ts.sort_unstable();
    ts.dedup();
    ts.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ts: impl Iterator<Item = i64>, slope: f64, intercept: f64) -> Vec<TimePoint> {
        ts.map(|t| TimePoint {
            t,
            value: slope * t as f64 + intercept,
        })
        .collect()
    }

    #[test]
    fn recovers_exact_line() {
        let points = line(0..20, 3.0, 7.0);
        let fit = fit_trend(&points, 8).unwrap();
        assert!((fit.model.slope - 3.0).abs() < 1e-9);
        assert!((fit.model.intercept - 7.0).abs() < 1e-8);
        assert_eq!(fit.train.len(), 12);
        assert_eq!(fit.test.len(), 8);
        assert!(fit.test_rmse.unwrap() < 1e-8);
    }

    #[test]
    fn recovers_line_on_calendar_time_axis() {
        // Realistic t values (2011 Q1 = 8044) make the design matrix poorly scaled.
        let points = line(8044..8100, 1250.0, -9_800_000.0);
        let fit = fit_trend(&points, DEFAULT_TEST_QUARTERS).unwrap();
        assert!((fit.model.slope - 1250.0).abs() < 1e-6);
        assert!(fit.test_rmse.unwrap() < 1e-3);
    }

    #[test]
    fn least_squares_on_noisy_points() {
        // Hand-computed: mean t = mean y = 1.5, Sxy = 4, Sxx = 5.
        let points = vec![
            TimePoint { t: 0, value: 0.0 },
            TimePoint { t: 1, value: 2.0 },
            TimePoint { t: 2, value: 1.0 },
            TimePoint { t: 3, value: 3.0 },
        ];
        let m = fit_line(&points).unwrap();
        assert!((m.slope - 0.8).abs() < 1e-10);
        assert!((m.intercept - 0.3).abs() < 1e-10);
    }

    #[test]
    fn zero_holdout_trains_on_everything() {
        let points = line(0..5, 1.0, 0.0);
        let fit = fit_trend(&points, 0).unwrap();
        assert_eq!(fit.train.len(), 5);
        assert!(fit.test.is_empty());
        assert_eq!(fit.test_rmse, None);
        assert_eq!(fit.t_last(), Some(4));
    }

    #[test]
    fn degenerate_training_slice_is_fatal() {
        let points = line(0..9, 1.0, 0.0);
        // One training row left.
        let err = fit_trend(&points, 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let same_t = vec![TimePoint { t: 5, value: 1.0 }, TimePoint { t: 5, value: 2.0 }];
        assert_eq!(fit_line(&same_t).unwrap_err().kind(), ErrorKind::InsufficientData);

        assert!(fit_trend(&points, 9).is_err());
    }

    #[test]
    fn forecast_horizon_follows_last_t() {
        let model = LinearModel { slope: 2.0, intercept: 1.0 };
        let out = forecast(&model, 40, 8);
        let ts: Vec<i64> = out.iter().map(|p| p.t).collect();
        assert_eq!(ts, (41..=48).collect::<Vec<_>>());
        assert_eq!(out[0].value, 83.0);
        assert!(forecast(&model, 40, 0).is_empty());
    }
}
