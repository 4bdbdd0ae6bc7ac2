//! Repository download endpoint.
//!
//! - GET <any path>?Repository=<suffix>&branch_name=<branch>
//!   Requires `Authorization: Bearer <token>`. Verifies the caller, archives
//!   `<subject><suffix>` at the latest commit of the branch (default `main`),
//!   uploads it to `<subject>/download-artifacts/<suffix>.zip` and answers
//!   with a plain-text message containing a signed link.
//! - OPTIONS <any path>
//!   CORS preflight.
//!
//! The path is not inspected: API Gateway may prefix it with a stage name or
//! a resource path, and every invocation is a download request.
//!
//! Each request runs Verifying → Archiving → Publishing → Done and stops in
//! Failed at the first error.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use tracing::{info, instrument, warn};

use crate::auth::bearer_token;
use crate::error::{AppError, Result, cors_headers};
use crate::git::archive_repository;
use crate::models::{ArchiveSummary, DownloadQuery};
use crate::routes::AppState;
use crate::storage::publish;

pub fn routes(state: AppState) -> Router {
    let endpoint: MethodRouter<AppState> = get(download).options(preflight);
    Router::new()
        .route("/", endpoint.clone())
        .route("/{*path}", endpoint)
        .with_state(state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Verifying,
    Archiving,
    Publishing,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct DownloadLink {
    /// The `Repository` value as the caller sent it.
    pub repository: String,
    pub summary: ArchiveSummary,
    pub url: String,
}

impl DownloadLink {
    pub fn message(&self) -> String {
        format!(
            "Temporary download link for {} (branch: {}, commit: {}): {}",
            self.repository, self.summary.branch, self.summary.commit_id, self.url
        )
    }
}

async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response> {
    // Parse errors surface only after the token is checked.
    let query = query
        .map(|Query(query)| query)
        .map_err(|rejection| AppError::InvalidQuery(rejection.body_text()));
    let link = create_download_link(&state, bearer_token(&headers), query).await?;
    Ok((StatusCode::OK, cors_headers(), link.message()).into_response())
}

async fn preflight() -> Response {
    (StatusCode::NO_CONTENT, cors_headers()).into_response()
}

#[instrument(skip_all)]
pub async fn create_download_link(
    state: &AppState,
    token: Option<&str>,
    query: Result<DownloadQuery>,
) -> Result<DownloadLink> {
    let mut stage = Stage::Verifying;
    let result = run_stages(state, token, query, &mut stage).await;
    if let Err(err) = &result {
        warn!(
            stage = ?Stage::Failed,
            failed_in = ?stage,
            error = %err,
            "pipeline stage"
        );
    }
    result
}

/// Drive the pipeline, leaving `stage` at the last stage entered.
async fn run_stages(
    state: &AppState,
    token: Option<&str>,
    query: Result<DownloadQuery>,
    stage: &mut Stage,
) -> Result<DownloadLink> {
    *stage = Stage::Verifying;
    info!(stage = ?stage, "pipeline stage");
    let identity = state.verifier.verify(token).await?;
    let query = query?;
    let repository = query.repository()?;
    let branch = query.branch();

    *stage = Stage::Archiving;
    info!(
        stage = ?stage,
        subject = %identity.subject,
        repository,
        branch,
        "pipeline stage"
    );
    let archive = archive_repository(
        state.source.as_ref(),
        &identity.repository_name(repository),
        branch,
        state.traversal,
    )
    .await?;
    let summary = &archive.summary;
    info!(
        repository = %summary.repository,
        commit_id = %summary.commit_id,
        files = summary.file_count,
        folders = summary.folder_count,
        size = summary.size_bytes,
        "repository archived"
    );

    *stage = Stage::Publishing;
    info!(stage = ?stage, "pipeline stage");
    let key = identity.storage_key(repository);
    let url = publish(state.store.as_ref(), &key, archive.bytes).await?;

    *stage = Stage::Done;
    info!(stage = ?stage, %key, "pipeline stage");
    Ok(DownloadLink {
        repository: repository.to_string(),
        summary: archive.summary,
        url,
    })
}
