//! The poll/claim loop: periodically looks for `TO_PROCESS` cases this
//! machine is eligible for, attempts a CAS `claim` on those the worker pool
//! still has room for, and hands winners to the pool. Completion (upload
//! then `complete`, per I3) runs as a continuation spawned alongside each
//! claim, so the poll loop itself never blocks on a job finishing.

use std::sync::Arc;

use gc_core::{CaseId, Clock};
use gc_registry::CaseRegistry;
use tracing::{info, instrument, warn};

use crate::complete;
use crate::scheduler::Scheduler;

#[instrument(skip(scheduler))]
pub async fn poll_once<C: Clock + 'static>(scheduler: &Arc<Scheduler<C>>) -> Result<usize, gc_registry::RegistryError> {
    if !scheduler.pool.is_accepting() {
        return Ok(0);
    }

    let candidates = scheduler
        .registry
        .find_claimable(
            &scheduler.config.user_group,
            &scheduler.config.instance,
            &scheduler.config.supported_applications,
        )
        .await?;

    let mut claimed = 0;
    for record in candidates {
        if !scheduler.pool.has_free_slot() {
            break;
        }
        if let Some(max) = scheduler.config.max_attempts {
            if record.processors.attempts.len() as u32 >= max {
                continue;
            }
        }
        if try_claim(scheduler, record.id.clone()).await {
            claimed += 1;
        }
    }
    Ok(claimed)
}

async fn try_claim<C: Clock + 'static>(scheduler: &Arc<Scheduler<C>>, id: CaseId) -> bool {
    let now = scheduler.clock.epoch_ms();
    match scheduler
        .registry
        .claim(&id, &scheduler.config.machine, &scheduler.config.user, now)
        .await
    {
        Ok(true) => {
            info!(case_id = %id, "claimed case");
            scheduler.clone().start_claimed(id).await;
            true
        }
        Ok(false) => false,
        Err(e) => {
            warn!(case_id = %id, error = %e, "claim attempt failed, will retry next poll");
            false
        }
    }
}

impl<C: Clock + 'static> Scheduler<C> {
    /// Starts a claimed case: submits it to the worker pool, spawns its
    /// heartbeat task, and spawns the continuation that runs completion or
    /// lets it fall through to reclamation on failure.
    pub(crate) async fn start_claimed(self: Arc<Self>, id: CaseId) {
        let record = match scheduler_get(&self, &id).await {
            Some(r) => r,
            None => return,
        };

        let adapter = match self.adapters.get(&record.application) {
            Some(a) => a.clone(),
            None => {
                warn!(case_id = %id, application = %record.application, "no local adapter, letting reclamation recover it");
                return;
            }
        };

        let input = Arc::new(crate::input::ArchiveInput {
            archive: self.archive.clone(),
            path: gc_archive::ArchivePath::input(&record.origin.user, &record.origin.machine, &id),
        });

        let descriptor = gc_workerpool::JobDescriptor { case_id: id.clone(), application: record.application.clone() };
        let handle = match self.pool.submit(descriptor, adapter, input).await {
            Ok(h) => h,
            Err(e) => {
                warn!(case_id = %id, error = %e, "worker pool rejected job, letting reclamation recover it");
                return;
            }
        };

        let token = self.active.register(id.clone());
        tokio::spawn(crate::heartbeat::run(
            self.registry.clone(),
            self.pool.clone(),
            id.clone(),
            self.config.machine.clone(),
            self.config.user.clone(),
            self.config.timing.heartbeat_interval,
            self.config.jitter,
            self.clock.clone(),
            token,
        ));

        let scheduler = self.clone();
        tokio::spawn(async move {
            complete::handle_outcome(scheduler, id, handle).await;
        });
    }
}

async fn scheduler_get<C: Clock + 'static>(scheduler: &Arc<Scheduler<C>>, id: &CaseId) -> Option<gc_core::CaseRecord> {
    match scheduler.registry.get(id).await {
        Ok(record) => record,
        Err(e) => {
            warn!(case_id = %id, error = %e, "failed to re-read claimed record");
            None
        }
    }
}
