pub mod dashboard;
pub mod importer;
pub mod query;
