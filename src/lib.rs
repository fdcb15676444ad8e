//! `uk-housing-trends` library crate.
//!
//! The binary (`housing`) is a thin wrapper around this library so every job
//! can be tested without spawning processes.
//!
//! Data flows raw CSV -> `clean` -> `aggregate` / `align` -> `deflate`, `fit`,
//! `analysis` -> `io::export` and `plot`.

pub mod aggregate;
pub mod align;
pub mod analysis;
pub mod app;
pub mod clean;
pub mod cli;
pub mod config;
pub mod deflate;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
