//! The three-function adapter contract, modeled as a capability object:
//! one `ApplicationAdapter` instance per application id, discovered by
//! scanning the `Applications` directory.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter failed: {0}")]
    Failed(String),
}

/// One input bundle: an ordered list of files to zip and upload as a
/// case's input archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBundleSpec {
    pub files: Vec<PathBuf>,
}

/// A capability object implementing one application's `send`/`process`/
/// `receive` triple. Adapter execution in a systems language spawns the
/// adapter as a subprocess (process isolation, cancellation by signal);
/// `gc-adapters` provides the concrete implementations.
#[async_trait]
pub trait ApplicationAdapter: Send + Sync {
    /// Produce one or more input-bundle specs for a user selection.
    async fn send(&self, user_selection: &str) -> Result<Vec<InputBundleSpec>, AdapterError>;

    /// Process materialized input files in `scratch_dir`, returning the
    /// output file paths (under `scratch_dir`) it produced.
    async fn process(
        &self,
        scratch_dir: &std::path::Path,
        input_files: &[PathBuf],
    ) -> Result<Vec<PathBuf>, AdapterError>;

    /// Side effects on the originator machine only; MUST be safe to re-run
    /// on the same outputs (append with de-dup, or overwrite) since it may
    /// be retried after a crash between completion and `markReceived`.
    async fn receive(
        &self,
        scratch_dir: &std::path::Path,
        output_files: &[PathBuf],
    ) -> Result<(), AdapterError>;
}
