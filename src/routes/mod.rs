//! API route handlers.
//!
//! - `download`: archive a caller's repository and return a signed link
//!   (GET on any path)

pub mod download;

use std::sync::Arc;

use axum::Router;

use crate::auth::TokenVerifier;
use crate::git::{SourceControl, TraversalOrder};
use crate::storage::ArtifactStore;

/// Explicitly constructed clients shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub source: Arc<dyn SourceControl>,
    pub store: Arc<dyn ArtifactStore>,
    pub traversal: TraversalOrder,
}

pub fn create_router(state: AppState) -> Router {
    Router::new().merge(download::routes(state))
}
