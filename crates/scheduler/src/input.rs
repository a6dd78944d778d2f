//! Bridges the Case Archive to the worker pool's [`JobInput`] contract:
//! pulls the input archive's bytes and unzips them into the job's scratch
//! directory before the adapter's `process` step runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gc_archive::{ArchivePath, CaseArchive};
use gc_workerpool::{JobInput, WorkerPoolError};

use crate::bundle::unzip_bytes;

pub struct ArchiveInput {
    pub archive: CaseArchive,
    pub path: ArchivePath,
}

#[async_trait]
impl JobInput for ArchiveInput {
    async fn materialize(&self, scratch_dir: &Path) -> Result<Vec<PathBuf>, WorkerPoolError> {
        let bytes = self
            .archive
            .get_input(&self.path)
            .await
            .map_err(|e| WorkerPoolError::Scratch {
                path: scratch_dir.to_path_buf(),
                source: std::io::Error::other(e.to_string()),
            })?;
        unzip_bytes(&bytes, scratch_dir).map_err(|e| WorkerPoolError::Scratch {
            path: scratch_dir.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })
    }
}
