use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::git::{ArchiveBuilder, SourceControl};
use crate::models::{ArchiveSummary, FileEntry};

pub const ROOT_FOLDER: &str = "/";

/// Order in which pending folders are taken off the frontier.
///
/// Only affects the sequence of listing calls; the set of archived files is
/// the same either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TraversalOrder {
    /// Stack: most recently discovered folder first.
    #[default]
    DepthFirst,
    /// Queue: folders in discovery order.
    BreadthFirst,
}

/// Everything found under the root at one commit.
#[derive(Debug, Clone, Default)]
pub struct TreeWalk {
    /// Files keyed by absolute path.
    pub files: BTreeMap<String, String>,
    pub folders_visited: usize,
}

/// A packaged repository snapshot.
#[derive(Debug, Clone)]
pub struct RepositoryArchive {
    pub summary: ArchiveSummary,
    pub bytes: Vec<u8>,
}

/// Walk every folder reachable from the root as of `commit`.
///
/// Iterative so deep trees cannot exhaust the call stack. Each folder path is
/// listed at most once, even if the service reports it more than once.
#[instrument(skip(source))]
pub async fn walk_tree(
    source: &dyn SourceControl,
    repository: &str,
    commit: &str,
    order: TraversalOrder,
) -> Result<TreeWalk> {
    let mut frontier = VecDeque::from([ROOT_FOLDER.to_string()]);
    let mut visited = HashSet::new();
    let mut walk = TreeWalk::default();

    loop {
        let next = match order {
            TraversalOrder::DepthFirst => frontier.pop_back(),
            TraversalOrder::BreadthFirst => frontier.pop_front(),
        };
        let Some(folder) = next else { break };

        if !visited.insert(folder.clone()) {
            warn!(%folder, "folder reported twice, skipping");
            continue;
        }

        let listing = source.list_folder(repository, &folder, commit).await?;
        walk.folders_visited += 1;
        debug!(
            %folder,
            sub_folders = listing.sub_folders.len(),
            files = listing.files.len(),
            "folder listed"
        );

        frontier.extend(listing.sub_folders);

        for FileEntry {
            absolute_path,
            blob_id,
        } in listing.files
        {
            if walk.files.contains_key(&absolute_path) {
                warn!(path = %absolute_path, "file reported twice, keeping first");
                continue;
            }
            walk.files.insert(absolute_path, blob_id);
        }
    }

    Ok(walk)
}

/// Snapshot `branch` of `repository` into a zip archive.
///
/// The branch is resolved once; every listing and blob read uses that commit,
/// so the archive is consistent even if the branch moves mid-walk.
#[instrument(skip(source))]
pub async fn archive_repository(
    source: &dyn SourceControl,
    repository: &str,
    branch: &str,
    order: TraversalOrder,
) -> Result<RepositoryArchive> {
    let commit_id = source.latest_commit(repository, branch).await?;
    let walk = walk_tree(source, repository, &commit_id, order).await?;

    let mut builder = ArchiveBuilder::new();
    for (path, blob_id) in &walk.files {
        let content = source.read_blob(repository, blob_id).await?;
        builder.add_file(path, &content)?;
    }

    let file_count = builder.entry_count();
    let bytes = builder.finish()?;
    debug!(%commit_id, files = file_count, "archive written");

    Ok(RepositoryArchive {
        summary: ArchiveSummary {
            repository: repository.to_string(),
            branch: branch.to_string(),
            commit_id,
            file_count,
            folder_count: walk.folders_visited,
            size_bytes: bytes.len(),
        },
        bytes,
    })
}
