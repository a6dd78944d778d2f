//! Bounded concurrent execution of adapter `process` invocations, each in
//! its own scratch directory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use gc_capability::ApplicationAdapter;
use gc_core::CaseId;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::WorkerPoolError;
use crate::job::{JobDescriptor, JobHandle, JobInput, JobOutcome};

pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    /// Serializes `set_capacity` calls against the semaphore's own
    /// bookkeeping (`add_permits`/`forget_permits` only move the count
    /// relative to the previous target, so concurrent resizes must not
    /// interleave).
    capacity: Arc<StdMutex<usize>>,
    accepting: Arc<AtomicBool>,
    scratch_root: PathBuf,
    tokens: Arc<StdMutex<HashMap<CaseId, CancellationToken>>>,
}

impl WorkerPool {
    pub fn new(capacity: usize, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity: Arc::new(StdMutex::new(capacity)),
            accepting: Arc::new(AtomicBool::new(true)),
            scratch_root: scratch_root.into(),
            tokens: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Live-adjustable. Lowering `n` never interrupts running jobs — it
    /// only reduces the permits available to future claims. Raising `n`
    /// permits new claims starting on the scheduler's next poll.
    pub fn set_capacity(&self, n: usize) {
        let mut current = self.capacity.lock().unwrap_or_else(|e| e.into_inner());
        if n > *current {
            self.semaphore.add_permits(n - *current);
        } else if n < *current {
            self.semaphore.forget_permits(*current - n);
        }
        *current = n;
    }

    pub fn capacity(&self) -> usize {
        *self.capacity.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the pool currently has a free slot without blocking. The
    /// scheduler consults this before each claim attempt.
    pub fn has_free_slot(&self) -> bool {
        self.accepting.load(Ordering::SeqCst) && self.semaphore.available_permits() > 0
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Stop accepting new jobs without killing running ones.
    pub fn pause(&self) {
        self.accepting.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.accepting.store(true, Ordering::SeqCst);
    }

    #[instrument(skip(self, adapter, input), fields(case_id = %job.case_id, application = %job.application))]
    pub async fn submit(
        &self,
        job: JobDescriptor,
        adapter: Arc<dyn ApplicationAdapter>,
        input: Arc<dyn JobInput>,
    ) -> Result<JobHandle, WorkerPoolError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(WorkerPoolError::Paused);
        }

        // Allow expect: `self.semaphore` is never closed — `WorkerPool` has
        // no `close()` and the semaphore is dropped only with the pool itself.
        #[allow(clippy::expect_used)]
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");

        let case_id = job.case_id.clone();
        let scratch_dir = self.scratch_root.join(case_id.as_str());
        let token = CancellationToken::new();
        self.tokens.lock().unwrap_or_else(|e| e.into_inner()).insert(case_id.clone(), token.clone());

        let tokens = self.tokens.clone();
        let wait_case_id = case_id.clone();

        let join = tokio::spawn(async move {
            let _permit = permit;
            let outcome = run_job(&scratch_dir, &token, adapter, input).await;
            match tokio::fs::remove_dir_all(&scratch_dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(?e, path = %scratch_dir.display(), "failed to clean up scratch directory"),
            }
            tokens.lock().unwrap_or_else(|e| e.into_inner()).remove(&wait_case_id);
            outcome
        });

        Ok(JobHandle { case_id, join })
    }

    /// Terminates the adapter invocation and reclaims the scratch
    /// directory. Best-effort: if the adapter already produced outputs but
    /// the scheduler has not yet uploaded them, cancellation discards them.
    pub fn cancel(&self, case_id: &CaseId) {
        if let Some(token) = self.tokens.lock().unwrap_or_else(|e| e.into_inner()).get(case_id) {
            info!(%case_id, "cancelling job");
            token.cancel();
        }
    }
}

async fn run_job(
    scratch_dir: &std::path::Path,
    token: &CancellationToken,
    adapter: Arc<dyn ApplicationAdapter>,
    input: Arc<dyn JobInput>,
) -> JobOutcome {
    if let Err(e) = tokio::fs::create_dir_all(scratch_dir).await {
        return JobOutcome::Failed(gc_capability::AdapterError::Failed(format!(
            "creating scratch dir {scratch_dir:?}: {e}"
        )));
    }

    tokio::select! {
        _ = token.cancelled() => JobOutcome::Cancelled,
        outcome = process(scratch_dir, adapter, input) => outcome,
    }
}

async fn process(
    scratch_dir: &std::path::Path,
    adapter: Arc<dyn ApplicationAdapter>,
    input: Arc<dyn JobInput>,
) -> JobOutcome {
    let input_files = match input.materialize(scratch_dir).await {
        Ok(files) => files,
        Err(e) => return JobOutcome::Failed(gc_capability::AdapterError::Failed(e.to_string())),
    };

    match adapter.process(scratch_dir, &input_files).await {
        Ok(outputs) => JobOutcome::Completed(outputs),
        Err(e) => JobOutcome::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::CopyInputs;
    use gc_adapters::FakeAdapter;
    use gc_core::ApplicationId;

    fn job(id: CaseId) -> JobDescriptor {
        JobDescriptor { case_id: id, application: ApplicationId::from("render") }
    }

    #[tokio::test]
    async fn submit_runs_the_adapter_and_cleans_up_scratch_dir() {
        let root = tempfile::tempdir().expect("tempdir");
        let pool = WorkerPool::new(2, root.path());

        let src_dir = tempfile::tempdir().expect("tempdir");
        let input_file = src_dir.path().join("in.bin");
        std::fs::write(&input_file, b"payload").expect("write");

        let id = CaseId::new();
        let handle = pool
            .submit(
                job(id.clone()),
                Arc::new(FakeAdapter::identity()),
                Arc::new(CopyInputs(vec![input_file])),
            )
            .await
            .expect("submit");

        match handle.wait().await {
            JobOutcome::Completed(outputs) => assert_eq!(outputs.len(), 1),
            other => panic!("expected completion, got {other:?}"),
        }

        assert!(!root.path().join(id.as_str()).exists());
    }

    #[tokio::test]
    async fn cancel_interrupts_a_running_job() {
        let root = tempfile::tempdir().expect("tempdir");
        let pool = WorkerPool::new(1, root.path());
        let id = CaseId::new();

        struct Blocking;
        #[async_trait::async_trait]
        impl ApplicationAdapter for Blocking {
            async fn send(
                &self,
                _: &str,
            ) -> Result<Vec<gc_capability::InputBundleSpec>, gc_capability::AdapterError> {
                Ok(vec![])
            }
            async fn process(
                &self,
                _: &std::path::Path,
                _: &[PathBuf],
            ) -> Result<Vec<PathBuf>, gc_capability::AdapterError> {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Ok(vec![])
            }
            async fn receive(
                &self,
                _: &std::path::Path,
                _: &[PathBuf],
            ) -> Result<(), gc_capability::AdapterError> {
                Ok(())
            }
        }

        let handle = pool
            .submit(job(id.clone()), Arc::new(Blocking), Arc::new(CopyInputs(vec![])))
            .await
            .expect("submit");

        pool.cancel(&id);
        assert!(matches!(handle.wait().await, JobOutcome::Cancelled));
    }

    #[test]
    fn lowering_capacity_does_not_panic_and_is_observable() {
        let root = tempfile::tempdir().expect("tempdir");
        let pool = WorkerPool::new(4, root.path());
        pool.set_capacity(1);
        assert_eq!(pool.capacity(), 1);
        pool.set_capacity(8);
        assert_eq!(pool.capacity(), 8);
    }

    #[test]
    fn pause_stops_accepting_new_jobs() {
        let root = tempfile::tempdir().expect("tempdir");
        let pool = WorkerPool::new(1, root.path());
        assert!(pool.is_accepting());
        pool.pause();
        assert!(!pool.is_accepting());
        pool.resume();
        assert!(pool.is_accepting());
    }
}
