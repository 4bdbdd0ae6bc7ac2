//! In-memory stand-ins for the external services.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::auth::TokenVerifier;
use crate::error::{AppError, Result};
use crate::git::SourceControl;
use crate::models::{FileEntry, FolderListing, Identity};
use crate::storage::ArtifactStore;

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

/// A single repository whose tree is built up file by file.
pub struct InMemoryRepository {
    name: String,
    branches: HashMap<String, String>,
    folders: HashMap<String, FolderListing>,
    blobs: HashMap<String, Vec<u8>>,
    listed: Mutex<Vec<(String, String)>>,
}

impl InMemoryRepository {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            branches: HashMap::new(),
            folders: HashMap::from([("/".to_string(), FolderListing::default())]),
            blobs: HashMap::new(),
            listed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_branch(mut self, branch: &str, commit: &str) -> Self {
        self.branches.insert(branch.to_string(), commit.to_string());
        self
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        let blob_id = format!("blob:{path}");
        let parent = parent_of(path).to_string();
        self.ensure_folder(&parent);
        self.folders
            .get_mut(&parent)
            .expect("parent folder exists")
            .files
            .push(FileEntry {
                absolute_path: path.to_string(),
                blob_id: blob_id.clone(),
            });
        self.blobs.insert(blob_id, content.to_vec());
        self
    }

    /// Report `child` under `parent` again, as a misbehaving service might.
    pub fn with_extra_sub_folder(mut self, parent: &str, child: &str) -> Self {
        self.folders
            .get_mut(parent)
            .expect("parent folder exists")
            .sub_folders
            .push(child.to_string());
        self
    }

    pub fn listed_folders(&self) -> Vec<String> {
        self.listed
            .lock()
            .unwrap()
            .iter()
            .map(|(folder, _)| folder.clone())
            .collect()
    }

    pub fn listed_commits(&self) -> Vec<String> {
        self.listed
            .lock()
            .unwrap()
            .iter()
            .map(|(_, commit)| commit.clone())
            .collect()
    }

    fn ensure_folder(&mut self, folder: &str) {
        if self.folders.contains_key(folder) {
            return;
        }
        let parent = parent_of(folder).to_string();
        self.ensure_folder(&parent);
        self.folders
            .get_mut(&parent)
            .expect("parent folder exists")
            .sub_folders
            .push(folder.to_string());
        self.folders
            .insert(folder.to_string(), FolderListing::default());
    }

    fn check_repository(&self, repository: &str) -> Result<()> {
        if repository == self.name {
            Ok(())
        } else {
            Err(AppError::RepositoryNotFound(repository.to_string()))
        }
    }
}

fn parent_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

#[async_trait]
impl SourceControl for InMemoryRepository {
    async fn latest_commit(&self, repository: &str, branch: &str) -> Result<String> {
        self.check_repository(repository)?;
        self.branches
            .get(branch)
            .cloned()
            .ok_or_else(|| AppError::BranchNotFound(branch.to_string()))
    }

    async fn list_folder(
        &self,
        repository: &str,
        folder: &str,
        commit: &str,
    ) -> Result<FolderListing> {
        self.check_repository(repository)?;
        if !self.branches.values().any(|c| c == commit) {
            return Err(AppError::PathNotFound(format!("{folder}@{commit}")));
        }
        let listing = self
            .folders
            .get(folder)
            .cloned()
            .ok_or_else(|| AppError::PathNotFound(format!("{folder}@{commit}")))?;
        self.listed
            .lock()
            .unwrap()
            .push((folder.to_string(), commit.to_string()));
        Ok(listing)
    }

    async fn read_blob(&self, repository: &str, blob_id: &str) -> Result<Vec<u8>> {
        self.check_repository(repository)?;
        self.blobs
            .get(blob_id)
            .cloned()
            .ok_or_else(|| AppError::PathNotFound(format!("blob {blob_id}")))
    }
}

// ---------------------------------------------------------------------------
// Token verification
// ---------------------------------------------------------------------------

/// Accepts exactly one token and rejects everything else with 401.
pub struct StubVerifier {
    token: String,
    subject: String,
    seen: Mutex<Vec<Option<String>>>,
}

impl StubVerifier {
    pub fn new(token: &str, subject: &str) -> Self {
        Self {
            token: token.to_string(),
            subject: subject.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: Option<&str>) -> Result<Identity> {
        self.seen.lock().unwrap().push(token.map(str::to_string));
        match token {
            Some(t) if t == self.token => Ok(Identity::new(self.subject.clone())),
            _ => Err(AppError::AuthFailure {
                status: StatusCode::UNAUTHORIZED,
                body: "{\"message\":\"Unauthorized\"}".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Artifact storage
// ---------------------------------------------------------------------------

/// Keeps uploads in memory and hands out fake signed URLs.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_uploads: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        if self.fail_uploads {
            return Err(AppError::Storage(format!("PutObject {key}: unavailable")));
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String> {
        Ok(format!("https://artifacts.test/{key}?expires=3600"))
    }
}
