pub mod api;
pub mod metric;

pub use metric::{Metric, Metrics};
