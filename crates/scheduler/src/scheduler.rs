//! The Scheduler / Lifecycle Engine: owns the registry, archive, worker
//! pool, and adapter set for one machine, and drives the poll/claim,
//! heartbeat, reclamation, and result-retrieval duties as independent
//! tasks sharing that state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use gc_archive::CaseArchive;
use gc_capability::ApplicationAdapter;
use gc_core::{ApplicationId, Clock, SystemClock};
use gc_registry::CaseRegistry;
use gc_workerpool::WorkerPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::active::ActiveClaims;
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::jitter::jittered;
use crate::{claim, reclaim, retrieve};

pub struct Scheduler<C: Clock = SystemClock> {
    pub(crate) config: SchedulerConfig,
    pub(crate) registry: Arc<dyn CaseRegistry>,
    pub(crate) archive: CaseArchive,
    pub(crate) pool: Arc<WorkerPool>,
    pub(crate) adapters: Arc<HashMap<ApplicationId, Arc<dyn ApplicationAdapter>>>,
    pub(crate) clock: C,
    pub(crate) active: Arc<ActiveClaims>,
    /// Scratch root used by the result-retrieval duty; distinct from the
    /// worker pool's own scratch root since it unzips results, not inputs.
    pub(crate) retrieval_root: PathBuf,
}

impl<C: Clock + 'static> Scheduler<C> {
    /// Refuses to construct with an invalid timing configuration (B1).
    pub fn new(
        config: SchedulerConfig,
        registry: Arc<dyn CaseRegistry>,
        archive: CaseArchive,
        pool: Arc<WorkerPool>,
        adapters: HashMap<ApplicationId, Arc<dyn ApplicationAdapter>>,
        clock: C,
        retrieval_root: impl Into<PathBuf>,
    ) -> Result<Arc<Self>, SchedulerError> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            registry,
            archive,
            pool,
            adapters: Arc::new(adapters),
            clock,
            active: Arc::new(ActiveClaims::new()),
            retrieval_root: retrieval_root.into(),
        }))
    }

    /// Spawns the poll/claim, reclamation, and result-retrieval loops as
    /// independent tasks. Heartbeat tasks are spawned per-claim as cases
    /// are won, not here.
    pub fn spawn(self: &Arc<Self>) -> SchedulerHandle {
        let shutdown = CancellationToken::new();

        let poll = tokio::spawn(poll_loop(self.clone(), shutdown.clone()));
        let reclaim = tokio::spawn(reclaim_loop(self.clone(), shutdown.clone()));
        let retrieve = tokio::spawn(retrieve_loop(self.clone(), shutdown.clone()));

        SchedulerHandle { shutdown, tasks: vec![poll, reclaim, retrieve] }
    }

    pub fn active_claim_count(&self) -> usize {
        self.active.len()
    }
}

/// A handle to a running scheduler's background tasks. Dropping it does not
/// stop them — call [`SchedulerHandle::shutdown`] for a clean stop.
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Signals all loops to stop after their current tick and waits for
    /// them to exit. In-flight jobs and their heartbeats are left running —
    /// this only stops the duties that originate new work.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

#[instrument(skip_all)]
async fn poll_loop<C: Clock + 'static>(scheduler: Arc<Scheduler<C>>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(jittered(scheduler.config.poll_interval, scheduler.config.jitter)) => {}
        }
        match claim::poll_once(&scheduler).await {
            Ok(n) if n > 0 => info!(claimed = n, "poll cycle claimed cases"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "poll cycle failed, retrying next tick"),
        }
    }
}

#[instrument(skip_all)]
async fn reclaim_loop<C: Clock + 'static>(scheduler: Arc<Scheduler<C>>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(jittered(scheduler.config.timing.reclamation_grace / 2, scheduler.config.jitter)) => {}
        }
        match reclaim::reclaim_once(&scheduler).await {
            Ok(n) if n > 0 => info!(reclaimed = n, "reclamation cycle recovered stale claims"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "reclamation cycle failed, retrying next scan"),
        }
    }
}

#[instrument(skip_all)]
async fn retrieve_loop<C: Clock + 'static>(scheduler: Arc<Scheduler<C>>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(jittered(scheduler.config.poll_interval, scheduler.config.jitter)) => {}
        }
        match retrieve::retrieve_once(&scheduler).await {
            Ok(n) if n > 0 => info!(received = n, "retrieval cycle received results"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "retrieval cycle failed, retrying next scan"),
        }
    }
}
