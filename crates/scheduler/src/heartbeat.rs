//! One task per actively processing case, emitting `heartbeat` at interval
//! `H`. A `false` response means the claim was reclaimed out from under
//! this machine (CLAIM_LOST): the local job is cancelled immediately rather
//! than left to run to an upload that would be rejected anyway.

use std::sync::Arc;
use std::time::Duration;

use gc_core::{CaseId, Clock, MachineId, UserId};
use gc_registry::CaseRegistry;
use gc_workerpool::WorkerPool;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::jitter::jittered;

#[instrument(skip(registry, pool, clock, token), fields(case_id = %case_id, machine = %machine))]
pub async fn run<C: Clock + 'static>(
    registry: Arc<dyn CaseRegistry>,
    pool: Arc<WorkerPool>,
    case_id: CaseId,
    machine: MachineId,
    user: UserId,
    interval: Duration,
    jitter_fraction: f64,
    clock: C,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(jittered(interval, jitter_fraction)) => {}
        }

        match registry.heartbeat(&case_id, &machine, &user, clock.epoch_ms()).await {
            Ok(true) => continue,
            Ok(false) => {
                warn!(%case_id, "claim lost, cancelling local job");
                pool.cancel(&case_id);
                return;
            }
            Err(e) => {
                warn!(%case_id, error = %e, "heartbeat failed, retrying next tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::test_support::sample_case;
    use gc_core::{FakeClock, MachineId, UserId};
    use gc_registry::EmbeddedRegistry;

    #[tokio::test(start_paused = true)]
    async fn stale_claim_cancels_the_local_job() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry: Arc<dyn CaseRegistry> = Arc::new(EmbeddedRegistry::open(dir.path()).await.expect("open"));
        let record = sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let machine = MachineId::from("m1");
        let user = UserId::from("u1");
        registry.claim(&id, &machine, &user, 0).await.expect("claim");
        // Reclaimed by someone else before the first heartbeat fires.
        registry.reclaim(&id, 1_000_000, 0).await.expect("reclaim");

        let pool_root = tempfile::tempdir().expect("tempdir");
        let pool = Arc::new(WorkerPool::new(1, pool_root.path()));
        let token = CancellationToken::new();
        let clock = FakeClock::new();

        run(
            registry.clone(),
            pool,
            id,
            machine,
            user,
            Duration::from_millis(1),
            0.0,
            clock,
            token,
        )
        .await;
    }
}
