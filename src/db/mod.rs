//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and query projections
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `CovidStorage`, the get-or-create/upsert and query layer

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbCountry, DbCovidRecord, ImportRow, NewCountry, SeriesPoint};
pub use schema::SQLITE_INIT;
pub use sqlite::{CovidStorage, SqlitePool, open};
