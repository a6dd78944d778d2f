//! Result-retrieval duty, run by the originator: scans for `PROCESSED`
//! cases this machine/user submitted, downloads and unzips the result
//! archive, hands it to the adapter's `receive` step, and only then marks
//! the case `RECEIVED`. `receive` must tolerate being re-run on the same
//! outputs, since a crash between it and `mark_received` replays this same
//! scan on the next tick.

use std::sync::Arc;

use gc_archive::ArchivePath;
use gc_core::{CaseId, Clock};
use tracing::{info, instrument, warn};

use crate::bundle::unzip_bytes;
use crate::error::SchedulerError;
use crate::scheduler::Scheduler;

#[instrument(skip(scheduler))]
pub async fn retrieve_once<C: Clock + 'static>(scheduler: &Arc<Scheduler<C>>) -> Result<usize, gc_registry::RegistryError> {
    let candidates = scheduler
        .registry
        .find_receivable(&scheduler.config.machine, &scheduler.config.user)
        .await?;

    let mut received = 0;
    for record in candidates {
        match retrieve_one(scheduler, &record).await {
            Ok(true) => received += 1,
            Ok(false) => {}
            Err(e) => warn!(case_id = %record.id, error = %e, "result retrieval failed, will retry next scan"),
        }
    }
    Ok(received)
}

impl<C: Clock + 'static> Scheduler<C> {
    /// Explicit single-case pull, for scripting/tests: `receive` the result
    /// for `id` right now rather than waiting for the next retrieval-duty
    /// scan. Requires the case to be `PROCESSED` and originated by this
    /// machine/user; returns `Ok(false)` if it isn't ready yet.
    #[instrument(skip(self))]
    pub async fn receive_case(self: &Arc<Self>, id: &CaseId) -> Result<bool, SchedulerError> {
        let record = self
            .registry
            .get(id)
            .await?
            .ok_or_else(|| SchedulerError::Internal(format!("no such case {id}")))?;
        if record.origin.machine != self.config.machine || record.origin.user != self.config.user {
            return Err(SchedulerError::Internal(format!(
                "case {id} was not submitted by this machine/user"
            )));
        }
        if record.status != gc_core::CaseStatus::Processed {
            return Ok(false);
        }
        retrieve_one(self, &record).await
    }
}

async fn retrieve_one<C: Clock + 'static>(
    scheduler: &Arc<Scheduler<C>>,
    record: &gc_core::CaseRecord,
) -> Result<bool, crate::error::SchedulerError> {
    let adapter = scheduler
        .adapters
        .get(&record.application)
        .ok_or_else(|| crate::error::SchedulerError::UnknownApplication(record.application.clone()))?
        .clone();

    let result_path = ArchivePath::result(&record.origin.user, &record.origin.machine, &record.id);
    if !scheduler.archive.result_exists(&result_path).await {
        return Ok(false);
    }
    let bytes = scheduler.archive.get_result(&result_path).await?;

    let scratch_dir = scheduler.retrieval_root.join(record.id.as_str());
    tokio::fs::create_dir_all(&scratch_dir)
        .await
        .map_err(|e| crate::error::SchedulerError::Internal(format!("creating {scratch_dir:?}: {e}")))?;
    let outputs = unzip_bytes(&bytes, &scratch_dir)?;

    adapter.receive(&scratch_dir, &outputs).await?;

    match tokio::fs::remove_dir_all(&scratch_dir).await {
        Ok(()) | Err(_) => {}
    }

    let now = scheduler.clock.epoch_ms();
    let ok = scheduler.registry.mark_received(&record.id, now).await?;
    if ok {
        info!(case_id = %record.id, "result received");
    }
    Ok(ok)
}
