//! Filesystem access abstracted behind a trait so tests can inject a
//! tempfile-backed root or a fault-injecting wrapper.
//!
//! The atomicity rule (§4.1): a zip MUST appear to readers only after it is
//! fully written. We write to a sibling temp name, fsync the file, rename
//! onto the canonical path, then fsync the containing directory so the
//! rename itself is durable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::Rng;

use crate::error::CaArchiveError;

#[async_trait]
pub trait ArchiveIo: Send + Sync {
    /// Write `bytes` so that readers either see the old contents (or
    /// nothing) or the complete new contents — never a partial write.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), CaArchiveError>;

    async fn read(&self, path: &Path) -> Result<Vec<u8>, CaArchiveError>;

    async fn remove(&self, path: &Path) -> Result<(), CaArchiveError>;

    async fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem, rooted at a configured directory.
pub struct FsArchiveIo {
    root: PathBuf,
}

impl FsArchiveIo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl ArchiveIo for FsArchiveIo {
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), CaArchiveError> {
        let full = self.full_path(path);
        let parent = full.parent().unwrap_or(&self.root).to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| CaArchiveError::from_io(parent.clone(), e))?;

        let suffix: u64 = rand::thread_rng().gen();
        let tmp = parent.join(format!(
            "{}.tmp-{suffix:016x}",
            full.file_name().and_then(|n| n.to_str()).unwrap_or("archive")
        ));

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| CaArchiveError::from_io(tmp.clone(), e))?;

        // fsync the temp file before the rename, per the atomic-replace
        // ordering: write-tmp -> fsync -> rename -> fsync-dir.
        let file = tokio::fs::File::open(&tmp)
            .await
            .map_err(|e| CaArchiveError::from_io(tmp.clone(), e))?;
        file.sync_all()
            .await
            .map_err(|e| CaArchiveError::from_io(tmp.clone(), e))?;
        drop(file);

        tokio::fs::rename(&tmp, &full)
            .await
            .map_err(|e| CaArchiveError::from_io(full.clone(), e))?;

        fsync_dir(&parent).await.map_err(|e| CaArchiveError::from_io(parent, e))?;

        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, CaArchiveError> {
        let full = self.full_path(path);
        tokio::fs::read(&full)
            .await
            .map_err(|e| CaArchiveError::from_io(full, e))
    }

    async fn remove(&self, path: &Path) -> Result<(), CaArchiveError> {
        let full = self.full_path(path);
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CaArchiveError::from_io(full, e)),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(self.full_path(path)).await.is_ok()
    }
}

#[cfg(unix)]
async fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&dir)?;
        file.sync_all()
    })
    .await
    .unwrap_or_else(|e| Err(std::io::Error::other(e)))
}

#[cfg(not(unix))]
async fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
