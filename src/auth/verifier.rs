//! Token verification against the external authorizer endpoint.
//!
//! The bearer token is forwarded unchanged. A non-success answer is surfaced
//! as [`AppError::AuthFailure`] carrying the authorizer's status and body so
//! the handler can return them verbatim.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::auth::TokenVerifier;
use crate::error::{AppError, Result};
use crate::models::Identity;

pub struct HttpTokenVerifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenVerifier {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, has_token = token.is_some()))]
    async fn verify(&self, token: Option<&str>) -> Result<Identity> {
        let mut request = self.http_client.get(&self.endpoint);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::Verifier(format!("authorizer request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AppError::Verifier(format!("failed to read authorizer response: {e}")))?;

        if !status.is_success() {
            warn!(%status, "authorizer rejected token");
            return Err(AppError::AuthFailure { status, body });
        }

        let claims: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| AppError::Verifier(format!("authorizer returned invalid JSON: {e}")))?;

        let subject = subject_from_claims(&claims).ok_or(AppError::MissingSubject)?;
        debug!(%subject, "token verified");
        Ok(Identity::new(subject))
    }
}

/// The `sub` claim, if present and a string.
pub fn subject_from_claims(claims: &serde_json::Value) -> Option<&str> {
    claims.get("sub").and_then(|v| v.as_str())
}
