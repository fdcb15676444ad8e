//! Inner-join alignment of quarterly series.
//!
//! Every quarterly dataset is keyed by `(year, quarter)`. Analyses that combine
//! datasets first align them here, keeping only the quarters present in all
//! inputs, then attach the continuous time index `t` for sorting and fitting.

pub mod frame;

pub use frame::*;
