//! File content retrieval and the batch extraction driver.

use crate::extract::extract_pom;
use crate::resolve::resolve_all;
use crate::types::ResolvedPomFile;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Content retrieval collaborator: given a file identifier, returns its
/// text or indicates absence. Read failures count as absence; they are
/// non-fatal to the batch.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_file_content(&self, path: &str) -> Option<String>;
}

/// [`ContentSource`] backed by the local filesystem, with file identifiers
/// resolved relative to a root directory.
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn get_file_content(&self, path: &str) -> Option<String> {
        match tokio::fs::read_to_string(self.root.join(path)).await {
            Ok(content) => Some(content),
            Err(err) => {
                debug!("cannot read {path}: {err}");
                None
            }
        }
    }
}

/// Runs the whole pipeline over a batch of pom.xml paths.
///
/// Contents are fetched concurrently (retrievals are independent), each
/// file is extracted on its own, and cross-file resolution runs once the
/// full batch is in hand. Unreadable or unrecognized files are dropped
/// with a diagnostic; input order is preserved for the survivors.
pub async fn extract_all_pom_files(
    source: &dyn ContentSource,
    paths: &[String],
) -> Vec<ResolvedPomFile> {
    let contents =
        futures::future::join_all(paths.iter().map(|p| source.get_file_content(p))).await;

    let mut files = Vec::new();
    for (path, content) in paths.iter().zip(contents) {
        let Some(content) = content else {
            debug!("skipping {path}: no content");
            continue;
        };
        match extract_pom(&content, Some(path)) {
            Some(file) => files.push(file),
            None => debug!("skipping {path}: not a recognized POM"),
        }
    }

    resolve_all(files)
}
