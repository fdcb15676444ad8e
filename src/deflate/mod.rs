//! CPI deflation: nominal quarterly values to real terms.

pub mod cpi;

pub use cpi::*;
