//! Source-control access and repository archiving.
//!
//! - `repository`: `SourceControl` backed by AWS CodeCommit
//! - `tree`: worklist traversal of a repository's folders at one commit
//! - `archive`: zip assembly of the discovered files

pub mod archive;
pub mod repository;
pub mod tree;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FolderListing;

pub use archive::ArchiveBuilder;
pub use repository::CodeCommitRepository;
pub use tree::{TraversalOrder, archive_repository};

/// The three source-control calls the archiver needs.
///
/// Kept narrow so traversal can run against an in-memory tree in tests.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Resolve `branch` to the id of its latest commit.
    async fn latest_commit(&self, repository: &str, branch: &str) -> Result<String>;

    /// List the immediate children of `folder` as of `commit`.
    async fn list_folder(
        &self,
        repository: &str,
        folder: &str,
        commit: &str,
    ) -> Result<FolderListing>;

    /// Fetch the raw bytes of a blob.
    async fn read_blob(&self, repository: &str, blob_id: &str) -> Result<Vec<u8>>;
}
