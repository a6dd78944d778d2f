//! What happens once a claimed job finishes: on success, the output bundle
//! is zipped and uploaded to the Case Archive *before* the registry is told
//! the case is `PROCESSED` (I3) — a crash between those two steps leaves the
//! case `PROCESSING` for reclamation to retry, never advertising a result
//! that doesn't exist yet.

use std::sync::Arc;

use gc_core::Clock;
use gc_workerpool::{JobHandle, JobOutcome};
use tracing::{info, instrument, warn};

use crate::bundle::zip_files;
use crate::scheduler::Scheduler;

#[instrument(skip(scheduler, handle), fields(case_id = %id))]
pub async fn handle_outcome<C: Clock + 'static>(scheduler: Arc<Scheduler<C>>, id: gc_core::CaseId, handle: JobHandle) {
    let outcome = handle.wait().await;
    scheduler.active.finish(&id);

    match outcome {
        JobOutcome::Completed(outputs) => {
            if let Err(e) = upload_and_complete(&scheduler, &id, &outputs).await {
                warn!(case_id = %id, error = %e, "completion failed, leaving case for reclamation");
            }
        }
        JobOutcome::Failed(e) => {
            warn!(case_id = %id, error = %e, "adapter failed, leaving case for reclamation");
        }
        JobOutcome::Cancelled => {
            info!(case_id = %id, "job cancelled, not completing");
        }
    }
}

async fn upload_and_complete<C: Clock + 'static>(
    scheduler: &Arc<Scheduler<C>>,
    id: &gc_core::CaseId,
    outputs: &[std::path::PathBuf],
) -> Result<(), crate::error::SchedulerError> {
    let record = scheduler
        .registry
        .get(id)
        .await?
        .ok_or_else(|| crate::error::SchedulerError::Internal(format!("case {id} vanished before upload")))?;

    let bytes = zip_files(outputs)?;
    scheduler
        .archive
        .put_result(id, &record.origin.user, &record.origin.machine, &bytes)
        .await?;

    let now = scheduler.clock.epoch_ms();
    let completed = scheduler
        .registry
        .complete(id, &scheduler.config.machine, &scheduler.config.user, now)
        .await?;
    if !completed {
        warn!(case_id = %id, "result uploaded but claim was already lost; left for reclamation");
    }
    Ok(())
}
