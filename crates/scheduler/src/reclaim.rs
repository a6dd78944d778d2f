//! Reclamation duty: periodically scans for cases stuck `PROCESSING` past
//! the grace period `G` and reclaims them back to `TO_PROCESS` so another
//! (or the same) machine can retry them. Runs independently of who holds
//! the stale claim — any machine in the grid can perform a reclaim.

use std::sync::Arc;

use gc_core::Clock;
use tracing::{info, instrument, warn};

use crate::scheduler::Scheduler;

#[instrument(skip(scheduler))]
pub async fn reclaim_once<C: Clock + 'static>(scheduler: &Arc<Scheduler<C>>) -> Result<usize, gc_registry::RegistryError> {
    let now = scheduler.clock.epoch_ms();
    let grace_ms = scheduler.config.timing.reclamation_grace.as_millis() as u64;

    let stale = scheduler.registry.find_reclaimable(now, grace_ms).await?;
    let mut reclaimed = 0;
    for record in stale {
        match scheduler.registry.reclaim(&record.id, now, grace_ms).await {
            Ok(true) => {
                info!(case_id = %record.id, "reclaimed stale claim");
                reclaimed += 1;
            }
            Ok(false) => {}
            Err(e) => warn!(case_id = %record.id, error = %e, "reclaim attempt failed, will retry next scan"),
        }
    }
    Ok(reclaimed)
}
