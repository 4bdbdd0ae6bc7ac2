use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, instrument};

use crate::error::{AppError, Result};
use crate::storage::ArtifactStore;

const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Download artifacts kept in a single S3 bucket.
pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
    presigned_url_ttl: Duration,
}

impl S3ArtifactStore {
    pub fn new(client: Client, bucket: impl Into<String>, presigned_url_ttl: Duration) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            presigned_url_ttl,
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(ZIP_CONTENT_TYPE)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 PutObject: {}", DisplayErrorContext(&e))))?;

        debug!("artifact uploaded");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn presigned_url(&self, key: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.presigned_url_ttl)
            .map_err(|e| AppError::Storage(format!("build PresigningConfig: {e}")))?;

        let req = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::Storage(format!("generate presigned URL: {}", DisplayErrorContext(&e)))
            })?;

        debug!(ttl_secs = self.presigned_url_ttl.as_secs(), "presigned URL generated");
        Ok(req.uri().to_string())
    }
}
