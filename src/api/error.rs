//! HTTP error mapping: one error type covering every handler, converted to a
//! JSON `{"error": ...}` body with the right status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::trading::TradeError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request shape or values (400).
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or no live session (401).
    #[error("Unauthorized")]
    Unauthorized,

    /// Unknown id on a lookup route (404).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Settlement failure; a FAILED transaction row was recorded where the
    /// trade reached settlement (400), storage failures map to 500.
    #[error(transparent)]
    Trade(#[from] TradeError),

    /// Unexpected persistence failure (500). Details are logged, not leaked.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Any other internal failure (500).
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Trade(TradeError::Storage(err)) => {
                error!(%err, "storage failure during trade");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Trade(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Storage(err) => {
                error!(%err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                error!(message = %msg, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
