//! Caller authentication.
//!
//! Token validation itself belongs to an external authorizer; this module
//! only extracts the bearer token and forwards it via [`TokenVerifier`].

pub mod verifier;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};

use crate::error::Result;
use crate::models::Identity;

pub use verifier::HttpTokenVerifier;

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Establish the caller's identity. `None` means no usable bearer token
    /// was presented; the authorizer is still asked so it can reject it.
    async fn verify(&self, token: Option<&str>) -> Result<Identity>;
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
