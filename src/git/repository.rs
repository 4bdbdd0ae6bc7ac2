use async_trait::async_trait;
use aws_sdk_codecommit::Client;
use aws_sdk_codecommit::error::DisplayErrorContext;
use tracing::{debug, instrument};

use crate::error::{AppError, Result};
use crate::git::SourceControl;
use crate::models::{FileEntry, FolderListing};

/// CodeCommit-backed source control.
pub struct CodeCommitRepository {
    client: Client,
}

impl CodeCommitRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceControl for CodeCommitRepository {
    #[instrument(skip(self))]
    async fn latest_commit(&self, repository: &str, branch: &str) -> Result<String> {
        let output = self
            .client
            .get_branch()
            .repository_name(repository)
            .branch_name(branch)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_repository_does_not_exist_exception()
                    || err.is_invalid_repository_name_exception()
                {
                    AppError::RepositoryNotFound(repository.to_string())
                } else if err.is_branch_does_not_exist_exception()
                    || err.is_invalid_branch_name_exception()
                {
                    AppError::BranchNotFound(branch.to_string())
                } else {
                    AppError::SourceControl(format!("GetBranch: {}", DisplayErrorContext(&err)))
                }
            })?;

        let commit_id = output
            .branch()
            .and_then(|b| b.commit_id())
            .ok_or_else(|| AppError::SourceControl(format!("branch {branch} has no commit")))?;

        debug!(%commit_id, "branch resolved");
        Ok(commit_id.to_string())
    }

    #[instrument(skip(self))]
    async fn list_folder(
        &self,
        repository: &str,
        folder: &str,
        commit: &str,
    ) -> Result<FolderListing> {
        let output = self
            .client
            .get_folder()
            .repository_name(repository)
            .folder_path(folder)
            .commit_specifier(commit)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_repository_does_not_exist_exception() {
                    AppError::RepositoryNotFound(repository.to_string())
                } else if err.is_folder_does_not_exist_exception()
                    || err.is_commit_does_not_exist_exception()
                {
                    AppError::PathNotFound(format!("{folder}@{commit}"))
                } else {
                    AppError::SourceControl(format!("GetFolder: {}", DisplayErrorContext(&err)))
                }
            })?;

        let sub_folders = output
            .sub_folders()
            .iter()
            .filter_map(|f| f.absolute_path().map(str::to_string))
            .collect();

        let mut files = Vec::with_capacity(output.files().len());
        for file in output.files() {
            let (Some(absolute_path), Some(blob_id)) = (file.absolute_path(), file.blob_id())
            else {
                return Err(AppError::SourceControl(format!(
                    "GetFolder returned an incomplete file entry under {folder}"
                )));
            };
            files.push(FileEntry {
                absolute_path: absolute_path.to_string(),
                blob_id: blob_id.to_string(),
            });
        }

        let skipped = output.symbolic_links().len() + output.sub_modules().len();
        if skipped > 0 {
            debug!(skipped, "ignoring symbolic links and submodules");
        }

        Ok(FolderListing { sub_folders, files })
    }

    #[instrument(skip(self))]
    async fn read_blob(&self, repository: &str, blob_id: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_blob()
            .repository_name(repository)
            .blob_id(blob_id)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_repository_does_not_exist_exception() {
                    AppError::RepositoryNotFound(repository.to_string())
                } else if err.is_blob_id_does_not_exist_exception() {
                    AppError::PathNotFound(format!("blob {blob_id}"))
                } else {
                    AppError::SourceControl(format!("GetBlob: {}", DisplayErrorContext(&err)))
                }
            })?;

        Ok(output.content.into_inner())
    }
}
