use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum DashError {
    #[error("Country code is required")]
    MissingCountry,

    #[error("No search query provided")]
    MissingQuery,

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    #[error("Country code \"{code}\" not found")]
    CountryNotFound {
        code: String,
        suggestions: Vec<String>,
    },

    #[error("No {metric} data available for {country}")]
    NoData { metric: String, country: String },

    #[error("No countries with complete data available")]
    NoSnapshot,

    #[error("CSV is missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for DashError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let (status, body) = match self {
            DashError::MissingCountry
            | DashError::MissingQuery
            | DashError::UnknownMetric(_)
            | DashError::InvalidDate
            | DashError::InvalidRange { .. } => {
                (StatusCode::BAD_REQUEST, ApiErrorBody::new(message))
            }
            DashError::CountryNotFound { suggestions, .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    suggestions: Some(suggestions),
                    ..ApiErrorBody::new(message)
                },
            ),
            DashError::NoData { .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    suggestion: Some("Try a different date range or metric"),
                    ..ApiErrorBody::new(message)
                },
            ),
            DashError::NoSnapshot => (StatusCode::NOT_FOUND, ApiErrorBody::new(message)),
            DashError::MissingColumn(_)
            | DashError::Chart(_)
            | DashError::DatabaseError(_)
            | DashError::Reqwest(_)
            | DashError::Csv(_)
            | DashError::Io(_) => {
                error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        details: Some(message),
                        ..ApiErrorBody::new("Server error".to_string())
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Flat JSON error payload: `{"error": ..., ...}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorBody {
    fn new(error: String) -> Self {
        Self {
            error,
            suggestions: None,
            suggestion: None,
            details: None,
        }
    }
}
