use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::validation::FieldErrors;

/// Application-level errors
///
/// Every client-visible variant carries an i18n lookup key, not user-facing
/// copy; clients resolve the key to localized text.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Malformed API payload, field-scoped (400)
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Malformed auth form payload, field-scoped (422)
    #[error("Form validation failed")]
    Form(FieldErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Conflict: {0}")]
    Conflict(&'static str),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Upstream metadata error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "VALIDATION", "fieldErrors": fields }),
            ),
            AppError::Form(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "VALIDATION", "fieldErrors": fields }),
            ),
            AppError::Unauthorized(code) => (StatusCode::UNAUTHORIZED, json!({ "error": code })),
            AppError::Conflict(code) => (StatusCode::CONFLICT, json!({ "error": code })),
            AppError::NotFound(code) => (StatusCode::NOT_FOUND, json!({ "error": code })),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream metadata failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "UPSTREAM_ERROR" }),
                )
            }
            AppError::HttpClient(e) => {
                tracing::warn!(error = %e, "Upstream metadata failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "UPSTREAM_ERROR" }),
                )
            }
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                // Never leak internals to the caller
                tracing::error!(error = %self, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "INTERNAL_ERROR" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_409() {
        let response = AppError::Conflict("REVIEW_EXISTS").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AppError::Unauthorized("UNAUTHORIZED").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_form_errors_map_to_422() {
        let mut fields = FieldErrors::new();
        fields.set("password", "REQUIRED");
        let response = AppError::Form(fields).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_upstream_failure_maps_to_500() {
        let response = AppError::Upstream("TMDB returned status 503".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_database_errors_map_to_500() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
