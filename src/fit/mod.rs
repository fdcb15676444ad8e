//! Trend fitting.
//!
//! Responsibilities:
//!
//! - split a time-indexed series into a training slice and a trailing hold-out
//! - fit a straight line to the training slice by ordinary least squares
//! - score the line on the hold-out and extrapolate it forward

pub mod trend;

pub use trend::*;
