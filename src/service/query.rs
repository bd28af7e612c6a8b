use crate::db::models::{CountrySummary, DbCountry, SeriesPoint};
use crate::db::CovidStorage;
use crate::error::DashError;
use crate::types::api::{SeriesParams, SeriesResponse};
use crate::types::metric::Metric;
use chrono::{Days, NaiveDate};

const SUGGESTION_LIMIT: i64 = 5;
const SEARCH_LIMIT: i64 = 10;

/// How missing `start_date`/`end_date` are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDefaults {
    /// 2020-01-01 through today.
    SincePandemicStart,
    /// The year ending at `end_date` (or today).
    TrailingYear,
}

/// A validated series query.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub country: String,
    pub metric: Metric,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CountrySeries {
    pub country: DbCountry,
    pub metric: Metric,
    pub points: Vec<SeriesPoint>,
}

impl CountrySeries {
    pub fn into_response(self, message: Option<&'static str>) -> SeriesResponse {
        let (dates, values) = self.points.into_iter().map(|p| (p.date, p.value)).unzip();
        SeriesResponse {
            country: self.country.name,
            metric: self.metric.title(),
            dates,
            values,
            units: self.metric.units(),
            message,
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, DashError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| DashError::InvalidDate)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate query parameters: country, then metric, then dates, then range order.
pub fn resolve_request(
    params: &SeriesParams,
    defaults: RangeDefaults,
    today: NaiveDate,
) -> Result<SeriesRequest, DashError> {
    let country = non_blank(params.country.as_deref())
        .ok_or(DashError::MissingCountry)?
        .to_uppercase();

    let metric = match non_blank(params.metric.as_deref()) {
        Some(raw) => raw.parse()?,
        None => Metric::default(),
    };

    let end = non_blank(params.end_date.as_deref())
        .map(parse_date)
        .transpose()?
        .unwrap_or(today);
    let start = match non_blank(params.start_date.as_deref()) {
        Some(raw) => parse_date(raw)?,
        None => match defaults {
            RangeDefaults::SincePandemicStart => pandemic_start(),
            RangeDefaults::TrailingYear => end.checked_sub_days(Days::new(365)).unwrap_or(end),
        },
    };

    if start > end {
        return Err(DashError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok(SeriesRequest {
        country,
        metric,
        start,
        end,
    })
}

fn pandemic_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Resolve an iso code case-insensitively; on a miss, attach up to five similar codes.
pub async fn lookup_country(storage: &CovidStorage, code: &str) -> Result<DbCountry, DashError> {
    match storage.find_country_ignore_case(code).await? {
        Some(country) => Ok(country),
        None => Err(DashError::CountryNotFound {
            code: code.to_string(),
            suggestions: storage.similar_iso_codes(code, SUGGESTION_LIMIT).await?,
        }),
    }
}

/// Non-null values of the requested metric, ascending by date. Empty is a not-found.
pub async fn country_series(
    storage: &CovidStorage,
    req: &SeriesRequest,
) -> Result<CountrySeries, DashError> {
    let country = lookup_country(storage, &req.country).await?;
    let points = storage
        .series(country.id, req.metric, req.start, req.end)
        .await?;
    if points.is_empty() {
        return Err(DashError::NoData {
            metric: req.metric.phrase(),
            country: country.name,
        });
    }
    Ok(CountrySeries {
        country,
        metric: req.metric,
        points,
    })
}

/// Substring search on country name, at most ten hits.
pub async fn search_countries(
    storage: &CovidStorage,
    query: Option<&str>,
) -> Result<Vec<CountrySummary>, DashError> {
    let query = non_blank(query).ok_or(DashError::MissingQuery)?;
    storage.search_by_name(query, SEARCH_LIMIT).await
}
