//! Descriptive statistics used by the analyses.
//!
//! Conventions follow the usual dataframe defaults:
//! - standard deviation is the sample estimate (`n - 1` denominator)
//! - percentage change is `(x_i / x_{i-1} - 1) * 100`

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{AppError, ErrorKind};

/// Root-mean-square error between two equally long slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    if actual.len() != predicted.len() {
        return Err(AppError::new(
            ErrorKind::Numeric,
            format!("RMSE needs equal lengths, got {} and {}.", actual.len(), predicted.len()),
        ));
    }
    if actual.is_empty() {
        return Err(AppError::new(ErrorKind::InsufficientData, "RMSE of an empty set is undefined."));
    }

    let sse: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok((sse / actual.len() as f64).sqrt())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quarter-over-quarter percentage change. The first element has no predecessor
/// and is `None`, as is any change from a zero value.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    out.push(None);
    for w in values.windows(2) {
        let change = if w[0] != 0.0 { Some((w[1] / w[0] - 1.0) * 100.0) } else { None };
        out.push(change);
    }
    out.truncate(values.len());
    out
}

/// Streaming mean/variance accumulator (Welford).
///
/// Used where the data does not fit in memory: values are pushed one at a time
/// and only three numbers are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation; `None` with fewer than two values.
    pub fn sample_std(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

/// Pearson correlation with a two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Pearson product-moment correlation of `x` and `y`.
///
/// The p-value tests `r = 0` with Student's t on `n - 2` degrees of freedom.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, AppError> {
    if x.len() != y.len() {
        return Err(AppError::new(
            ErrorKind::Numeric,
            format!("Correlation needs equal lengths, got {} and {}.", x.len(), y.len()),
        ));
    }
    let n = x.len();
    if n < 3 {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!("Correlation needs at least 3 paired observations, got {n}."),
        ));
    }

    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(AppError::new(
            ErrorKind::Numeric,
            "Correlation is undefined for a constant input.",
        ));
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);

    let df = (n - 2) as f64;
    let p_value = if r.abs() >= 1.0 {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| AppError::new(ErrorKind::Numeric, format!("Invalid t distribution: {e}")))?;
        (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
    };

    Ok(Correlation { r, p_value, n })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmse_of_identical_series_is_zero() {
        assert_eq!(rmse(&[1.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
        assert!((rmse(&[0.0, 0.0], &[3.0, 4.0]).unwrap() - 12.5_f64.sqrt()).abs() < 1e-12);
        assert!(rmse(&[], &[]).is_err());
    }

    #[test]
    fn pct_change_first_is_missing() {
        let out = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(out[0], None);
        assert!((out[1].unwrap() - 10.0).abs() < 1e-9);
        assert!((out[2].unwrap() + 10.0).abs() < 1e-9);
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn running_stats_matches_two_pass() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut acc = RunningStats::default();
        values.iter().for_each(|&v| acc.push(v));

        let m = mean(&values).unwrap();
        let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        assert_eq!(acc.count(), 8);
        assert!((acc.mean().unwrap() - 5.0).abs() < 1e-12);
        assert!((acc.sample_std().unwrap() - var.sqrt()).abs() < 1e-12);

        let mut single = RunningStats::default();
        single.push(1.0);
        assert_eq!(single.sample_std(), None);
    }

    #[test]
    fn pearson_perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        let c = pearson(&x, &y).unwrap();
        assert!((c.r - 1.0).abs() < 1e-12);
        assert!(c.p_value < 1e-9);

        let y_neg = [9.0, 7.0, 5.0, 3.0];
        assert!((pearson(&x, &y_neg).unwrap().r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_p_value_in_range() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let c = pearson(&x, &y).unwrap();
        assert!(c.r > 0.0 && c.r < 1.0);
        assert!(c.p_value > 0.0 && c.p_value < 1.0);
    }

    #[test]
    fn pearson_rejects_degenerate_inputs() {
        assert_eq!(
            pearson(&[1.0, 2.0], &[1.0, 2.0]).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap_err().kind(),
            ErrorKind::Numeric
        );
    }
}
