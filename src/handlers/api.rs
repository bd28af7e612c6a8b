use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Serialize;

use crate::db::models::{CountrySummary, DataStatus, RecentRecord};
use crate::service::{dashboard, query};
use crate::service::query::RangeDefaults;
use crate::types::api::{
    GlobalSnapshot, SearchParams, SearchResponse, SeriesParams, SeriesResponse,
};
use crate::{DashError, router::DashState};

const DEBUG_RECENT_LIMIT: i64 = 5;

/// GET /api/country_data -> one metric for one country, 2020-01-01..today by default.
pub async fn country_data_handler(
    State(state): State<DashState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<SeriesResponse>, DashError> {
    let req = query::resolve_request(
        &params,
        RangeDefaults::SincePandemicStart,
        Utc::now().date_naive(),
    )?;
    let series = query::country_series(&state.storage, &req).await?;
    Ok(Json(series.into_response(None)))
}

/// GET /api/dashboard_data -> same series, defaulting to the trailing year.
pub async fn dashboard_data_handler(
    State(state): State<DashState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<SeriesResponse>, DashError> {
    let req = query::resolve_request(
        &params,
        RangeDefaults::TrailingYear,
        Utc::now().date_naive(),
    )?;
    let series = query::country_series(&state.storage, &req).await?;
    Ok(Json(series.into_response(Some("Success"))))
}

pub async fn country_search_handler(
    State(state): State<DashState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, DashError> {
    let hits = query::search_countries(&state.storage, params.q.as_deref()).await?;
    Ok(Json(hits))
}

pub async fn data_status_handler(
    State(state): State<DashState>,
) -> Result<Json<DataStatus>, DashError> {
    Ok(Json(state.storage.status().await?))
}

pub async fn global_snapshot_handler(
    State(state): State<DashState>,
) -> Result<Json<GlobalSnapshot>, DashError> {
    Ok(Json(dashboard::global_snapshot(&state.storage).await?))
}

pub async fn debug_all_countries_handler(
    State(state): State<DashState>,
) -> Result<Json<Vec<CountrySummary>>, DashError> {
    Ok(Json(state.storage.list_countries().await?))
}

#[derive(Debug, Serialize)]
pub struct DebugCountryResponse {
    pub country: String,
    pub data: Vec<RecentRecord>,
}

pub async fn debug_country_data_handler(
    State(state): State<DashState>,
    Path(iso_code): Path<String>,
) -> Result<Json<DebugCountryResponse>, DashError> {
    let country = query::lookup_country(&state.storage, &iso_code).await?;
    let data = state
        .storage
        .recent_records(country.id, DEBUG_RECENT_LIMIT)
        .await?;
    Ok(Json(DebugCountryResponse {
        country: country.name,
        data,
    }))
}
