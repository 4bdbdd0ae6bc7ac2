//! Repository download links.
//!
//! Verifies the caller's bearer token, zips their CodeCommit repository at the
//! latest commit of a branch, stores the zip in S3 and answers with a
//! time-limited download URL.
//!
//! # Usage
//! ```bash
//! # Under the Lambda runtime (AWS_LAMBDA_RUNTIME_API is set by the platform)
//! BUCKET_NAME=artifacts AUTHORIZER_ENDPOINT_URL=https://auth/verify repo-download
//!
//! # Locally
//! repo-download --bucket-name artifacts --authorizer-endpoint-url http://localhost:9000/verify
//! curl -H 'Authorization: Bearer <token>' 'http://127.0.0.1:3001/?Repository=myrepo'
//! ```

mod auth;
mod config;
mod error;
mod git;
mod models;
mod routes;
mod storage;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::HttpTokenVerifier;
use config::Config;
use git::CodeCommitRepository;
use routes::AppState;
use storage::S3ArtifactStore;

/// Set by the Lambda platform inside a function's execution environment.
const LAMBDA_RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let timeout = config.upstream_timeout();

    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::standard().with_max_attempts(config.upstream_max_attempts))
        .timeout_config(
            TimeoutConfig::builder()
                .operation_attempt_timeout(timeout)
                .build(),
        )
        .load()
        .await;

    let codecommit = aws_sdk_codecommit::Client::new(&aws_config);
    let s3 = aws_sdk_s3::Client::new(&aws_config);

    let http_client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("failed to build reqwest client")?;

    tracing::info!(
        bucket = %config.bucket_name,
        region = ?aws_config.region(),
        max_attempts = config.upstream_max_attempts,
        timeout_secs = config.upstream_timeout_secs,
        "clients initialised"
    );

    Ok(AppState {
        verifier: Arc::new(HttpTokenVerifier::new(
            http_client,
            config.authorizer_endpoint_url.clone(),
        )),
        source: Arc::new(CodeCommitRepository::new(codecommit)),
        store: Arc::new(S3ArtifactStore::new(
            s3,
            config.bucket_name.clone(),
            config.presigned_url_ttl(),
        )),
        traversal: config.traversal_order,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let on_lambda = std::env::var_os(LAMBDA_RUNTIME_API_ENV).is_some();

    // CloudWatch does not render ANSI colours
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_ansi(!on_lambda))
        .init();

    let state = build_state(&config).await?;

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    if on_lambda {
        tracing::info!("serving through the Lambda runtime");
        return lambda_http::run(app).await.map_err(|e| anyhow::anyhow!(e));
    }

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(%addr, "listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
        tracing::info!("shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
