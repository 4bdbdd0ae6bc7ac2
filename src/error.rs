//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all error conditions and implements Axum's
//! `IntoResponse` to convert errors to HTTP responses. Every response carries
//! the fixed permissive CORS headers from `cors_headers()`.
//!
//! Error mappings:
//! - `AuthFailure` → authorizer status and body, forwarded verbatim
//! - `MissingSubject` → 401
//! - `MissingParameter`, `InvalidQuery` → 400
//! - `RepositoryNotFound`, `BranchNotFound`, `PathNotFound` → 404
//! - `Verifier`, `SourceControl`, `Storage` → 502
//! - `Archive` → 500

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authorizer rejected token with status {status}")]
    AuthFailure { status: StatusCode, body: String },

    #[error("Token has no subject claim")]
    MissingSubject,

    #[error("Authorizer error: {0}")]
    Verifier(String),

    #[error("Missing query parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Source control error: {0}")]
    SourceControl(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthFailure { status, .. } => *status,
            AppError::MissingSubject => StatusCode::UNAUTHORIZED,
            AppError::MissingParameter(_) | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::RepositoryNotFound(_)
            | AppError::BranchNotFound(_)
            | AppError::PathNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Verifier(_) | AppError::SourceControl(_) | AppError::Storage(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fixed permissive CORS headers attached to every handler response.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(
            "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token",
        ),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("*"),
    );
    headers
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            // Forwarded as-is so callers see exactly what the authorizer said.
            AppError::AuthFailure { body, .. } => (status, cors_headers(), body).into_response(),
            other => {
                tracing::warn!(%status, error = %other, "request failed");
                let body = Json(json!({
                    "error": other.to_string(),
                }));
                (status, cors_headers(), body).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
