//! Inbound request and caller identity.
//!
//! - `DownloadQuery`: query string of a download request
//! - `Identity`: verified caller, derived once per request

use serde::Deserialize;

use crate::error::{AppError, Result};

pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "Repository")]
    pub repository: Option<String>,
    pub branch_name: Option<String>,
}

impl DownloadQuery {
    /// Logical repository name suffix. An empty value is accepted.
    pub fn repository(&self) -> Result<&str> {
        self.repository
            .as_deref()
            .ok_or_else(|| AppError::MissingParameter("Repository".to_string()))
    }

    pub fn branch(&self) -> &str {
        self.branch_name.as_deref().unwrap_or(DEFAULT_BRANCH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Full repository name: the subject followed directly by the suffix.
    pub fn repository_name(&self, suffix: &str) -> String {
        format!("{}{}", self.subject, suffix)
    }

    /// Object key for the caller's artifact. Branch does not take part, so
    /// a newer download of the same repository replaces the previous one.
    pub fn storage_key(&self, repository: &str) -> String {
        format!("{}/download-artifacts/{}.zip", self.subject, repository)
    }
}
