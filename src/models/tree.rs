//! Folder listing and archive DTOs.
//!
//! - `FolderListing`: one folder's immediate children at a commit
//! - `FileEntry`: a file and the blob backing it
//! - `ArchiveSummary`: what was packaged, for logging and the response

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: String,
    pub blob_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    pub sub_folders: Vec<String>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub repository: String,
    pub branch: String,
    pub commit_id: String,
    pub file_count: usize,
    pub folder_count: usize,
    pub size_bytes: usize,
}
