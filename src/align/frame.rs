//! Aligned multi-column frame and the inner-join aligner.

use log::debug;

use crate::domain::{QuarterKey, QuarterlySeries};
use crate::error::AppError;

/// One quarter of an aligned frame; `values` follow the frame's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub key: QuarterKey,
    pub t: i64,
    pub values: Vec<f64>,
}

/// Result of joining quarterly series on `(year, quarter)`.
///
/// Invariants:
/// - every row has a value for every column
/// - rows are sorted by strictly increasing `t`
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrame {
    columns: Vec<String>,
    rows: Vec<AlignedRow>,
}

impl AlignedFrame {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, AppError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AppError::schema(format!("Aligned frame has no column `{name}`.")))
    }

    /// Copy one column out, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, AppError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Append a derived column. `values` must have one entry per row.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AppError> {
        let name = name.into();
        if self.columns.iter().any(|c| *c == name) {
            return Err(AppError::schema(format!("Aligned frame already has a column `{name}`.")));
        }
        if values.len() != self.rows.len() {
            return Err(AppError::schema(format!(
                "Column `{name}` has {} values but the frame has {} rows.",
                values.len(),
                self.rows.len()
            )));
        }

        for (row, v) in self.rows.iter_mut().zip(values) {
            row.values.push(v);
        }
        self.columns.push(name);
        Ok(())
    }
}

/// Inner-join two or more quarterly series on the exact `(year, quarter)` pair.
///
/// Quarters missing from any input are dropped for all inputs; nothing is
/// interpolated or matched to a nearby quarter. An empty intersection yields an
/// empty frame, which downstream stages reject explicitly.
pub fn align(series: &[&QuarterlySeries]) -> Result<AlignedFrame, AppError> {
    if series.len() < 2 {
        return Err(AppError::schema(format!(
            "Alignment needs at least two series, got {}.",
            series.len()
        )));
    }

    let mut columns: Vec<String> = Vec::with_capacity(series.len());
    for s in series {
        if columns.iter().any(|c| c == s.name()) {
            return Err(AppError::schema(format!("Series name `{}` appears twice in the join.", s.name())));
        }
        columns.push(s.name().to_string());
    }

    let (first, rest) = series.split_first().ok_or_else(|| AppError::schema("No series to align."))?;

    let mut rows: Vec<AlignedRow> = first
        .observations()
        .iter()
        .filter_map(|obs| {
            let mut values = Vec::with_capacity(series.len());
            values.push(obs.value);
            for other in rest {
                values.push(other.get(obs.key)?);
            }
            Some(AlignedRow {
                key: obs.key,
                t: obs.key.time_index(),
                values,
            })
        })
        .collect();

    rows.sort_by_key(|r| r.t);

    debug!(
        "aligned {} series ({}) into {} rows",
        series.len(),
        columns.join(", "),
        rows.len()
    );

    Ok(AlignedFrame { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Quarter, QuarterlyObservation};

    fn quarters(from: i32, to: i32, base: f64) -> Vec<QuarterlyObservation> {
        (from..=to)
            .flat_map(|y| (1..=4).map(move |q| (y, q)))
            .enumerate()
            .map(|(i, (y, q))| QuarterlyObservation {
                key: QuarterKey::new(y, Quarter::new(q).unwrap()),
                value: base + i as f64,
            })
            .collect()
    }

    #[test]
    fn join_keeps_only_shared_quarters() {
        let a = QuarterlySeries::new("a", quarters(2011, 2015, 0.0)).unwrap();
        let b = QuarterlySeries::new("b", quarters(2013, 2017, 100.0)).unwrap();

        let frame = align(&[&a, &b]).unwrap();
        assert_eq!(frame.len(), 12);
        assert_eq!(frame.columns(), ["a".to_string(), "b".to_string()]);

        let first = &frame.rows()[0];
        let last = &frame.rows()[11];
        assert_eq!(first.key, QuarterKey::new(2013, Quarter::Q1));
        assert_eq!(last.key, QuarterKey::new(2015, Quarter::Q4));

        for row in frame.rows() {
            assert_eq!(a.get(row.key), Some(row.values[0]));
            assert_eq!(b.get(row.key), Some(row.values[1]));
        }
        assert!(frame.rows().windows(2).all(|w| w[1].t == w[0].t + 1));
    }

    #[test]
    fn join_with_gap_excludes_missing_quarter() {
        let mut obs = quarters(2012, 2012, 0.0);
        obs.remove(2); // drop 2012 Q3
        let a = QuarterlySeries::new("a", obs).unwrap();
        let b = QuarterlySeries::new("b", quarters(2012, 2012, 10.0)).unwrap();
        let c = QuarterlySeries::new("c", quarters(2011, 2013, 20.0)).unwrap();

        let frame = align(&[&a, &b, &c]).unwrap();
        let keys: Vec<String> = frame.rows().iter().map(|r| r.key.label()).collect();
        assert_eq!(keys, ["2012 Q1", "2012 Q2", "2012 Q4"]);
        assert!(frame.len() <= a.len().min(b.len()).min(c.len()));
    }

    #[test]
    fn disjoint_series_align_to_empty_frame() {
        let a = QuarterlySeries::new("a", quarters(2001, 2002, 0.0)).unwrap();
        let b = QuarterlySeries::new("b", quarters(2010, 2011, 0.0)).unwrap();
        let frame = align(&[&a, &b]).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn single_series_is_rejected() {
        let a = QuarterlySeries::new("a", quarters(2001, 2002, 0.0)).unwrap();
        assert!(align(&[&a]).is_err());
    }

    #[test]
    fn push_column_checks_length() {
        let a = QuarterlySeries::new("a", quarters(2012, 2012, 0.0)).unwrap();
        let b = QuarterlySeries::new("b", quarters(2012, 2012, 0.0)).unwrap();
        let mut frame = align(&[&a, &b]).unwrap();
        assert!(frame.push_column("c", vec![1.0]).is_err());
        frame.push_column("c", vec![1.0; 4]).unwrap();
        assert_eq!(frame.column("c").unwrap(), vec![1.0; 4]);
    }
}
