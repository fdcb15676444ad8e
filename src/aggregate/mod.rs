//! Yearly aggregations feeding the volatility analyses.

pub mod volatility;
pub mod yearly;

pub use volatility::*;
pub use yearly::*;
