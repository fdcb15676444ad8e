//! PNG charts through the plotters bitmap backend.
//!
//! Charts carry no text: plotters is built without a font backend, and no
//! label area is reserved. Titles and axis names stay in the [`Chart`] for
//! logging.

use std::error::Error;
use std::path::Path;

use log::info;
use plotters::prelude::*;

use crate::error::{AppError, ErrorKind};
use crate::io::export::ensure_parent_dir;
use crate::plot::chart::{Axis, Chart, ChartRenderer, Rgb, Series, SeriesStyle};

const MARKER_RADIUS: i32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct PngRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

impl ChartRenderer for PngRenderer {
    fn render(&self, chart: &Chart, path: &Path) -> Result<(), AppError> {
        ensure_parent_dir(path)?;
        self.draw(chart, path).map_err(|e| {
            AppError::new(
                ErrorKind::Render,
                format!("Failed to render '{}' to '{}': {e}", chart.title, path.display()),
            )
        })?;
        info!("chart '{}' written to {}", chart.title, path.display());
        Ok(())
    }
}

impl PngRenderer {
    fn draw(&self, chart: &Chart, path: &Path) -> Result<(), Box<dyn Error>> {
        let (x, y) = chart.bounds(Axis::Primary).ok_or("chart has no finite data")?;

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(20)
            .build_cartesian_2d(x[0]..x[1], y[0]..y[1])?;

        ctx.configure_mesh()
            .bold_line_style(RGBColor(200, 200, 200))
            .light_line_style(RGBColor(235, 235, 235))
            .draw()?;

        for s in chart.series_on(Axis::Primary) {
            let color = rgb(s.color);
            match s.style {
                SeriesStyle::Line => {
                    ctx.draw_series(LineSeries::new(finite(s), color.stroke_width(2)))?;
                }
                SeriesStyle::Scatter => {
                    ctx.draw_series(finite(s).map(|p| Circle::new(p, MARKER_RADIUS, color.filled())))?;
                }
            }
        }

        if let Some((_, y2)) = chart.bounds(Axis::Secondary) {
            let mut dual = ctx.set_secondary_coord(x[0]..x[1], y2[0]..y2[1]);
            for s in chart.series_on(Axis::Secondary) {
                let color = rgb(s.color);
                match s.style {
                    SeriesStyle::Line => {
                        dual.draw_secondary_series(LineSeries::new(finite(s), color.stroke_width(2)))?;
                    }
                    SeriesStyle::Scatter => {
                        dual.draw_secondary_series(
                            finite(s).map(|p| Circle::new(p, MARKER_RADIUS, color.filled())),
                        )?;
                    }
                }
            }
        }

        root.present()?;
        Ok(())
    }
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

fn finite(s: &Series) -> impl Iterator<Item = (f64, f64)> + '_ {
    s.points.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite())
}
