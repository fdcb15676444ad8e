//! Analyses over the cleaned and aggregated datasets.
//!
//! Everything here is pure: inputs are already-loaded series, outputs are
//! rows ready to export plus any summary statistic. File and chart handling
//! lives in the pipelines.

pub mod affordability;
pub mod changes;
pub mod timeline;
pub mod volatility;

pub use affordability::*;
pub use changes::*;
pub use timeline::*;
pub use volatility::*;
