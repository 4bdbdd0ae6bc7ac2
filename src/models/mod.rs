//! Data types passed between the pipeline stages.
//!
//! - `request`: DownloadQuery, Identity
//! - `tree`: FolderListing, FileEntry, ArchiveSummary

pub mod request;
pub mod tree;

pub use request::*;
pub use tree::*;
