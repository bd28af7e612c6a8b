use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::{Days, Utc};
use tracing::warn;

use crate::charts::{html, line_chart, ranking_chart};
use crate::service::query::RangeDefaults;
use crate::service::{dashboard, query};
use crate::types::api::{CompareParams, SeriesParams};
use crate::types::metric::Metric;
use crate::{DashError, router::DashState};

const TOP_COUNTRIES: usize = 10;

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

/// GET /dashboard -> selectors for country, metric and range over the last 365 days.
pub async fn interactive_handler(
    State(state): State<DashState>,
) -> Result<Html<String>, DashError> {
    let countries = state.storage.list_countries().await?;
    let end = Utc::now().date_naive();
    let start = end.checked_sub_days(Days::new(365)).unwrap_or(end);
    Ok(Html(html::interactive_page(&countries, start, end)))
}

/// GET /dashboard/chart -> SVG line chart of one metric for one country.
pub async fn country_chart_handler(
    State(state): State<DashState>,
    Query(params): Query<SeriesParams>,
) -> Result<Response, DashError> {
    let req = query::resolve_request(
        &params,
        RangeDefaults::TrailingYear,
        Utc::now().date_naive(),
    )?;
    let series = query::country_series(&state.storage, &req).await?;
    let title = format!("{}: {}", series.country.name, series.metric.title());
    let svg = line_chart(
        &title,
        series.metric.units(),
        &[(series.country.name.clone(), series.points)],
    )?;
    Ok(svg_response(svg))
}

/// GET /dashboard/compare?countries=USA,GBR -> one line per country over its full history.
pub async fn comparison_chart_handler(
    State(state): State<DashState>,
    Query(params): Query<CompareParams>,
) -> Result<Response, DashError> {
    let codes = dashboard::parse_country_list(params.countries.as_deref().unwrap_or_default());
    if codes.is_empty() {
        return Err(DashError::MissingCountry);
    }
    let metric = match params.metric.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => raw.parse()?,
        None => Metric::default(),
    };

    let lines = dashboard::comparison_series(&state.storage, &codes, metric).await?;
    let svg = line_chart(
        &format!("{} Over Time", metric.title()),
        metric.units(),
        &lines,
    )?;
    Ok(svg_response(svg))
}

/// GET /dashboard/global -> ranking of cases per million on the latest date.
/// Missing data renders an error page rather than a JSON error.
pub async fn global_dashboard_handler(State(state): State<DashState>) -> Response {
    const TITLE: &str = "Global dashboard";

    let rendered = match dashboard::global_snapshot(&state.storage).await {
        Ok(snapshot) => {
            let top = dashboard::top_by_cases_per_million(&snapshot, TOP_COUNTRIES);
            ranking_chart("Top 10 Countries by Cases per Million", &top)
                .map(|svg| html::global_page(&snapshot, &svg))
        }
        Err(e) => Err(e),
    };

    match rendered {
        Ok(page) => Html(page).into_response(),
        Err(DashError::NoSnapshot) => Html(html::error_page(
            TITLE,
            &DashError::NoSnapshot.to_string(),
        ))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "global dashboard failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(html::error_page(TITLE, &format!("Error loading data: {e}"))),
            )
                .into_response()
        }
    }
}
