//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the quarter key (`Quarter`, `QuarterKey`) and the continuous time index
//! - quarterly series with a one-row-per-quarter invariant (`QuarterlySeries`)
//! - annual datasets (price/salary, income groups, volatility)
//! - fit outputs (`LinearModel`)

pub mod types;

pub use types::*;
