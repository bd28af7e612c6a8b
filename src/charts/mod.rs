//! Chart rendering: SVG via plotters, wrapped in small HTML pages.

pub mod html;
pub mod svg;

pub use svg::{line_chart, ranking_chart};
