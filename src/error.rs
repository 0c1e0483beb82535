//! API error taxonomy.
//!
//! Every handler failure is translated to an HTTP status here. Unexpected
//! failures are logged with full detail and leave only a generic message
//! outward.

use crate::auth::user_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid input - 400
    Validation(&'static str),
    /// Duplicate unique key - 409
    Conflict(&'static str),
    /// Bad credentials - 401, one generic message for every cause
    InvalidCredentials,
    /// Resource absent - 404
    NotFound(&'static str),
    /// Payment provider call failed - 500
    Payment,
    /// Unexpected failure - 500, detail stays in the logs
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Payment => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create checkout session",
            ),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::DuplicateEmail => ApiError::Conflict("Email already registered"),
            StoreError::InvalidCredentials => ApiError::InvalidCredentials,
            StoreError::Hash(e) => {
                error!("Password hashing failed: {}", e);
                ApiError::Internal
            }
            StoreError::Database(e) => {
                error!("Database error: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("Unexpected error: {:#}", e);
        ApiError::Internal
    }
}
