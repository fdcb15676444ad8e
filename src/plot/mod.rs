//! Chart descriptions and the renderers that turn them into files.

pub mod chart;
pub mod png;

pub use chart::*;
pub use png::PngRenderer;
