use crate::db::CovidStorage;
use crate::db::models::{CountryCases, SeriesPoint};
use crate::error::DashError;
use crate::service::query::lookup_country;
use crate::types::api::{GlobalEntry, GlobalSnapshot};
use crate::types::metric::Metric;

/// Cases per million inhabitants; `None` when either side is unknown or zero.
pub fn cases_per_million(total_cases: Option<f64>, population: Option<i64>) -> Option<f64> {
    let cases = total_cases.filter(|c| *c != 0.0)?;
    let population = population.filter(|p| *p != 0)?;
    Some(cases * 1e6 / population as f64)
}

fn to_entry(row: CountryCases) -> Option<GlobalEntry> {
    let cases_per_million = cases_per_million(row.total_cases, row.population)?;
    Some(GlobalEntry {
        iso_code: row.iso_code,
        country: row.name,
        total_cases: row.total_cases?,
        cases_per_million,
    })
}

/// Cases per million for every populated country on the latest date with case data.
pub async fn global_snapshot(storage: &CovidStorage) -> Result<GlobalSnapshot, DashError> {
    let last_updated = storage
        .latest_date_with_cases()
        .await?
        .ok_or(DashError::NoSnapshot)?;

    let countries: Vec<GlobalEntry> = storage
        .cases_on(last_updated)
        .await?
        .into_iter()
        .filter_map(to_entry)
        .collect();
    if countries.is_empty() {
        return Err(DashError::NoSnapshot);
    }

    Ok(GlobalSnapshot {
        last_updated,
        countries,
    })
}

/// The `n` entries with the highest cases per million, descending.
pub fn top_by_cases_per_million(snapshot: &GlobalSnapshot, n: usize) -> Vec<&GlobalEntry> {
    let mut ranked: Vec<&GlobalEntry> = snapshot.countries.iter().collect();
    ranked.sort_by(|a, b| b.cases_per_million.total_cmp(&a.cases_per_million));
    ranked.truncate(n);
    ranked
}

/// Full history of one metric for several countries, keyed by country name.
/// Countries without any value are left out.
pub async fn comparison_series(
    storage: &CovidStorage,
    iso_codes: &[String],
    metric: Metric,
) -> Result<Vec<(String, Vec<SeriesPoint>)>, DashError> {
    let mut lines = Vec::with_capacity(iso_codes.len());
    for code in iso_codes {
        let country = lookup_country(storage, code).await?;
        let points = storage.full_series(country.id, metric).await?;
        if !points.is_empty() {
            lines.push((country.name, points));
        }
    }
    Ok(lines)
}

/// Split `USA, gbr,,FRA` into upper-cased, de-duplicated codes.
pub fn parse_country_list(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let code = code.to_uppercase();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}
