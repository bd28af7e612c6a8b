use crate::db::models::CountrySummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query string of the series endpoints and the chart view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesParams {
    pub country: Option<String>,
    pub metric: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `countries` is a comma-separated list of iso codes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareParams {
    pub countries: Option<String>,
    pub metric: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesResponse {
    pub country: String,
    pub metric: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub units: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub type SearchResponse = Vec<CountrySummary>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GlobalEntry {
    pub iso_code: String,
    pub country: String,
    pub total_cases: f64,
    pub cases_per_million: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GlobalSnapshot {
    pub last_updated: NaiveDate,
    pub countries: Vec<GlobalEntry>,
}
