pub mod charts;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod service;
pub mod types;

pub use db::CovidStorage;
pub use error::DashError;
pub use types::{Metric, Metrics};
