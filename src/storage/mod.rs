//! Artifact storage and signed download links.

pub mod s3;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::error::Result;

pub use s3::S3ArtifactStore;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Time-limited, credential-free download URL for `key`.
    async fn presigned_url(&self, key: &str) -> Result<String>;
}

/// Upload an archive and return a signed link to it.
#[instrument(skip(store, bytes), fields(size = bytes.len()))]
pub async fn publish(store: &dyn ArtifactStore, key: &str, bytes: Vec<u8>) -> Result<String> {
    store.upload(key, bytes).await?;
    let url = store.presigned_url(key).await?;
    info!("artifact published");
    Ok(url)
}
