//! The unit of work handed from the scheduler to the pool, and the inputs
//! it materializes into a fresh scratch directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gc_core::{ApplicationId, CaseId};

use crate::error::WorkerPoolError;

#[derive(Clone, Debug)]
pub struct JobDescriptor {
    pub case_id: CaseId,
    pub application: ApplicationId,
}

/// Supplies the files a job's `process` invocation should see, in declared
/// order. Implementations materialize them into the job's fresh scratch
/// directory however is appropriate — the pool only owns the directory's
/// lifecycle.
#[async_trait]
pub trait JobInput: Send + Sync {
    async fn materialize(&self, scratch_dir: &Path) -> Result<Vec<PathBuf>, WorkerPoolError>;
}

/// Copies a fixed, pre-resolved list of local files into the scratch
/// directory, preserving file names and declared order.
pub struct CopyInputs(pub Vec<PathBuf>);

#[async_trait]
impl JobInput for CopyInputs {
    async fn materialize(&self, scratch_dir: &Path) -> Result<Vec<PathBuf>, WorkerPoolError> {
        let mut materialized = Vec::with_capacity(self.0.len());
        for source in &self.0 {
            let name = source.file_name().unwrap_or(source.as_os_str());
            let dest = scratch_dir.join(name);
            tokio::fs::copy(source, &dest)
                .await
                .map_err(|e| WorkerPoolError::Scratch { path: dest.clone(), source: e })?;
            materialized.push(dest);
        }
        Ok(materialized)
    }
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed(Vec<PathBuf>),
    Failed(gc_capability::AdapterError),
    Cancelled,
}

/// A handle to a running or finished job. Awaiting it yields the outcome;
/// dropping it does not cancel the job (use [`crate::WorkerPool::cancel`]).
pub struct JobHandle {
    pub case_id: CaseId,
    pub(crate) join: tokio::task::JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub async fn wait(self) -> JobOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(_) => JobOutcome::Cancelled,
        }
    }
}
