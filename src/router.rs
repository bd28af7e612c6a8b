use axum::{Router, routing::get};

use crate::db::CovidStorage;
use crate::handlers::{api, dashboard};

#[derive(Clone)]
pub struct DashState {
    pub storage: CovidStorage,
}

impl DashState {
    pub fn new(storage: CovidStorage) -> Self {
        Self { storage }
    }
}

pub fn dash_router(state: DashState) -> Router {
    Router::new()
        .route("/api/country_data", get(api::country_data_handler))
        .route("/api/dashboard_data", get(api::dashboard_data_handler))
        .route("/api/search", get(api::country_search_handler))
        .route("/api/status", get(api::data_status_handler))
        .route("/api/global", get(api::global_snapshot_handler))
        .route("/api/debug/countries", get(api::debug_all_countries_handler))
        .route(
            "/api/debug/countries/{iso_code}",
            get(api::debug_country_data_handler),
        )
        .route("/dashboard", get(dashboard::interactive_handler))
        .route("/dashboard/chart", get(dashboard::country_chart_handler))
        .route("/dashboard/compare", get(dashboard::comparison_chart_handler))
        .route("/dashboard/global", get(dashboard::global_dashboard_handler))
        .with_state(state)
}
