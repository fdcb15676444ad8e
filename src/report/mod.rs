//! Terminal summaries for every job.

mod format;

pub use format::*;
