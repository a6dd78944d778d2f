// SPDX-License-Identifier: MIT

//! Case Archive (CA): deterministic, atomic filesystem placement of input
//! and result bundles.
//!
//! CA is purely path- and bytes-level — it knows nothing about case
//! lifecycle status. The Scheduler is responsible for sequencing CA writes
//! before the Registry transitions that advertise them (I3, I4).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod error;
mod io;
mod path;

use std::sync::Arc;

use gc_core::{CaseId, MachineId, UserId};
use tracing::instrument;

pub use error::CaArchiveError;
pub use io::{ArchiveIo, FsArchiveIo};
pub use path::ArchivePath;

/// The Case Archive facade. Cheap to clone — holds only an `Arc` to the
/// underlying I/O implementation.
#[derive(Clone)]
pub struct CaseArchive {
    io: Arc<dyn ArchiveIo>,
}

impl CaseArchive {
    pub fn new(io: Arc<dyn ArchiveIo>) -> Self {
        Self { io }
    }

    /// A `CaseArchive` backed by the real filesystem rooted at `root`.
    pub fn at(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FsArchiveIo::new(root)))
    }

    #[instrument(skip(self, bytes), fields(case_id = %id))]
    pub async fn put_input(
        &self,
        id: &CaseId,
        user: &UserId,
        machine: &MachineId,
        bytes: &[u8],
    ) -> Result<ArchivePath, CaArchiveError> {
        let path = ArchivePath::input(user, machine, id);
        self.io.write_atomic(path.as_path(), bytes).await?;
        Ok(path)
    }

    #[instrument(skip(self))]
    pub async fn get_input(&self, path: &ArchivePath) -> Result<Vec<u8>, CaArchiveError> {
        self.io.read(path.as_path()).await
    }

    #[instrument(skip(self, bytes), fields(case_id = %id))]
    pub async fn put_result(
        &self,
        id: &CaseId,
        user: &UserId,
        machine: &MachineId,
        bytes: &[u8],
    ) -> Result<ArchivePath, CaArchiveError> {
        let path = ArchivePath::result(user, machine, id);
        self.io.write_atomic(path.as_path(), bytes).await?;
        Ok(path)
    }

    #[instrument(skip(self))]
    pub async fn get_result(&self, path: &ArchivePath) -> Result<Vec<u8>, CaArchiveError> {
        self.io.read(path.as_path()).await
    }

    #[instrument(skip(self))]
    pub async fn result_exists(&self, path: &ArchivePath) -> bool {
        self.io.exists(path.as_path()).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, path: &ArchivePath) -> Result<(), CaArchiveError> {
        self.io.remove(path.as_path()).await
    }
}
