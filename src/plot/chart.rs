//! Render-only chart description.
//!
//! Pipelines build a [`Chart`] from their results and hand it to a
//! [`ChartRenderer`]. Bounds are derived from the data here so renderers only
//! draw, and the data prep can be tested without touching a backend.

use std::path::Path;

use log::debug;

use crate::error::AppError;

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const BLUE: Rgb = [31, 119, 180];
pub const ORANGE: Rgb = [255, 127, 14];
pub const GREEN: Rgb = [44, 160, 44];
pub const RED: Rgb = [214, 39, 40];

/// Palette cycled through for charts with a variable number of series.
pub const PALETTE: [Rgb; 4] = [BLUE, ORANGE, GREEN, RED];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    Line,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Primary,
    /// Right-hand y axis sharing the x axis.
    Secondary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub style: SeriesStyle,
    pub axis: Axis,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
        }
    }

    pub fn with_series(
        mut self,
        name: impl Into<String>,
        points: Vec<(f64, f64)>,
        style: SeriesStyle,
        axis: Axis,
        color: Rgb,
    ) -> Self {
        self.series.push(Series {
            name: name.into(),
            points,
            style,
            axis,
            color,
        });
        self
    }

    pub fn line(self, name: impl Into<String>, points: Vec<(f64, f64)>, color: Rgb) -> Self {
        self.with_series(name, points, SeriesStyle::Line, Axis::Primary, color)
    }

    pub fn scatter(self, name: impl Into<String>, points: Vec<(f64, f64)>, color: Rgb) -> Self {
        self.with_series(name, points, SeriesStyle::Scatter, Axis::Primary, color)
    }

    pub fn secondary_line(self, name: impl Into<String>, points: Vec<(f64, f64)>, color: Rgb) -> Self {
        self.with_series(name, points, SeriesStyle::Line, Axis::Secondary, color)
    }

    pub fn series_on(&self, axis: Axis) -> impl Iterator<Item = &Series> {
        self.series.iter().filter(move |s| s.axis == axis)
    }

    /// Padded `(x, y)` ranges over the finite points of every series on `axis`.
    ///
    /// The x range always spans every series so both axes line up.
    /// Returns `None` when the axis has no finite point.
    pub fn bounds(&self, axis: Axis) -> Option<([f64; 2], [f64; 2])> {
        let x = padded_range(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))?;
        let y = padded_range(self.series_on(axis).flat_map(|s| s.points.iter().map(|p| p.1)))?;
        Some((x, y))
    }
}

fn padded_range(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { lo.abs().max(1.0) * 0.5 };
    Some([lo - pad, hi + pad])
}

/// Turns a [`Chart`] into an output file.
pub trait ChartRenderer {
    fn render(&self, chart: &Chart, path: &Path) -> Result<(), AppError>;
}

/// Renderer used with `--no-plot`: draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ChartRenderer for NullRenderer {
    fn render(&self, chart: &Chart, path: &Path) -> Result<(), AppError> {
        debug!("plotting disabled, skipping '{}' ({})", chart.title, path.display());
        Ok(())
    }
}
