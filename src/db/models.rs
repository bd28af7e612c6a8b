use crate::types::metric::Metrics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbCountry {
    pub id: i64,
    pub iso_code: String,
    pub name: String,
    pub continent: String,
    pub population: Option<i64>,
}

/// Country fields as they arrive from the feed, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCountry {
    pub iso_code: String,
    pub name: String,
    pub continent: String,
    pub population: Option<i64>,
}

/// A normalized feed row: the country it belongs to and its metrics for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub country: NewCountry,
    pub date: NaiveDate,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbCovidRecord {
    pub id: i64,
    pub country_id: i64,
    pub date: NaiveDate,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// One `(date, value)` point of a single metric; never carries a NULL.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// `{iso_code, name}` projection used by search and listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct CountrySummary {
    pub iso_code: String,
    pub name: String,
}

/// Recent record joined with its country, as reported by the status endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct SampleRecord {
    pub date: NaiveDate,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub country_name: String,
    pub country_population: Option<i64>,
}

/// Recent record of one country, as reported by the debug endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct RecentRecord {
    pub date: NaiveDate,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
}

/// Country with its population and `total_cases` on a given date.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CountryCases {
    pub iso_code: String,
    pub name: String,
    pub population: Option<i64>,
    pub total_cases: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataStatus {
    pub total_countries: i64,
    pub countries_with_population: i64,
    pub total_covid_records: i64,
    pub latest_date: Option<NaiveDate>,
    pub sample_data: Vec<SampleRecord>,
}
