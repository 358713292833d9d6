use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use personafy_core::error::CoreError;
use personafy_pipeline::error::TransformError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`TransformError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// `{ "error", "code", "details"? }` JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `personafy_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A transformation request failure from the pipeline.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failure outside the request taxonomy: an unreadable body or a
    /// crashed pipeline task. Rendered as 500 with the cause in `details`.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message used whenever internal details must not reach the client.
const SANITIZED_MESSAGE: &str = "An internal error occurred";

/// Message for failures outside the request taxonomy, shared with the panic
/// handler.
pub(crate) const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<String> = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Transform pipeline errors ---
            AppError::Transform(err) => match err {
                TransformError::MissingParameters => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
                }
                TransformError::InvalidParameter(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                TransformError::CharacterNotFound => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                TransformError::RecordCreation(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                ),
                TransformError::ModelUnavailable { details: upstream } => {
                    details = Some(upstream.clone());
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "UPSTREAM_ERROR",
                        err.to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Anything else ---
            AppError::Unexpected(cause) => {
                tracing::error!(error = %cause, "Unexpected error");
                details = Some(cause.clone());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    UNEXPECTED_MESSAGE.to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                SANITIZED_MESSAGE.to_string(),
            )
        }
    }
}
