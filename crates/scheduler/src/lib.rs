// SPDX-License-Identifier: MIT

//! Scheduler / Lifecycle Engine (SLE): the distributed case-claim state
//! machine. Owns the poll/claim loop, per-claim heartbeats, the
//! reclamation duty, result retrieval, and submission — the only component
//! that sequences writes across the Case Registry, Case Archive, and
//! Worker Pool.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod active;
mod bundle;
mod claim;
mod complete;
mod config;
mod error;
mod heartbeat;
mod input;
mod jitter;
mod reclaim;
mod retrieve;
mod scheduler;
mod submit;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use scheduler::{Scheduler, SchedulerHandle};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use gc_adapters::FakeAdapter;
    use gc_archive::CaseArchive;
    use gc_capability::ApplicationAdapter;
    use gc_core::{ApplicationId, FakeClock, Instance, MachineId, Timing, UserGroup, UserId};
    use gc_registry::{CaseRegistry, EmbeddedRegistry};
    use gc_workerpool::WorkerPool;

    use super::*;

    fn config(machine: &str) -> SchedulerConfig {
        SchedulerConfig {
            machine: MachineId::from(machine),
            user: UserId::from("alice"),
            user_group: UserGroup::from("eng"),
            instance: Instance::from("default"),
            supported_applications: vec![ApplicationId::from("render")],
            timing: Timing::new(std::time::Duration::from_millis(1), std::time::Duration::from_millis(100)),
            poll_interval: std::time::Duration::from_millis(1),
            jitter: 0.0,
            max_attempts: None,
        }
    }

    async fn scheduler(machine: &str, root: &std::path::Path) -> (Arc<Scheduler<FakeClock>>, Arc<dyn CaseRegistry>) {
        let registry: Arc<dyn CaseRegistry> =
            Arc::new(EmbeddedRegistry::open(root.join("registry")).await.expect("open registry"));
        scheduler_with_registry(machine, root, registry).await
    }

    async fn scheduler_with_registry(
        machine: &str,
        root: &std::path::Path,
        registry: Arc<dyn CaseRegistry>,
    ) -> (Arc<Scheduler<FakeClock>>, Arc<dyn CaseRegistry>) {
        let archive = CaseArchive::at(root.join("archive"));
        let pool = Arc::new(WorkerPool::new(4, root.join("scratch").join(machine)));
        let mut adapters: HashMap<ApplicationId, Arc<dyn ApplicationAdapter>> = HashMap::new();
        adapters.insert(ApplicationId::from("render"), Arc::new(FakeAdapter::identity()));

        let scheduler = Scheduler::new(
            config(machine),
            registry.clone(),
            archive,
            pool,
            adapters,
            FakeClock::new(),
            root.join("retrieve").join(machine),
        )
        .expect("valid config");
        (scheduler, registry)
    }

    #[tokio::test]
    async fn submit_then_poll_claims_and_completes_the_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (scheduler, registry) = scheduler("m1", dir.path()).await;

        let input_dir = tempfile::tempdir().expect("tempdir");
        let input_file = input_dir.path().join("payload.bin");
        std::fs::write(&input_file, b"hello").expect("write");

        let ids = scheduler
            .submit(ApplicationId::from("render"), input_file.to_str().unwrap())
            .await
            .expect("submit");
        assert_eq!(ids.len(), 1);
        let id = ids[0].clone();

        let record = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(record.status, gc_core::CaseStatus::ToProcess);

        let claimed = claim::poll_once(&scheduler).await.expect("poll");
        assert_eq!(claimed, 1);

        // Wait for the spawned completion continuation to land.
        for _ in 0..200 {
            if registry.get(&id).await.expect("get").expect("present").status == gc_core::CaseStatus::Processed {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let record = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(record.status, gc_core::CaseStatus::Processed);
    }

    #[tokio::test]
    async fn two_machines_racing_a_claim_only_one_wins_p2() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry: Arc<dyn CaseRegistry> =
            Arc::new(EmbeddedRegistry::open(dir.path().join("registry")).await.expect("open"));
        let record = gc_core::test_support::sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let (m1, _) = scheduler_with_registry("m1", dir.path(), registry.clone()).await;
        let (m2, _) = scheduler_with_registry("m2", dir.path(), registry.clone()).await;

        let a = claim::poll_once(&m1).await.expect("poll m1");
        let b = claim::poll_once(&m2).await.expect("poll m2");
        assert_eq!(a + b, 1, "exactly one of the two racing machines wins the claim");

        let final_record = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(final_record.processors.attempts.len(), 1);
    }

    #[tokio::test]
    async fn reclaim_once_recovers_a_stale_processing_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (scheduler, registry) = scheduler("m1", dir.path()).await;

        let record = gc_core::test_support::sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");
        registry
            .claim(&id, &MachineId::from("m2"), &UserId::from("bob"), 0)
            .await
            .expect("claim");

        // No more heartbeats arrive; the grace period (100ms in `config`)
        // elapses entirely.
        scheduler.clock.advance(std::time::Duration::from_millis(500));

        let n = reclaim::reclaim_once(&scheduler).await.expect("reclaim_once");
        assert_eq!(n, 1);

        let after = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(after.status, gc_core::CaseStatus::ToProcess);
    }

    #[tokio::test]
    async fn retrieve_once_marks_a_processed_case_received() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (scheduler, registry) = scheduler("m1", dir.path()).await;

        let input_dir = tempfile::tempdir().expect("tempdir");
        let input_file = input_dir.path().join("payload.bin");
        std::fs::write(&input_file, b"hello").expect("write");

        let ids = scheduler
            .submit(ApplicationId::from("render"), input_file.to_str().unwrap())
            .await
            .expect("submit");
        let id = ids[0].clone();

        claim::poll_once(&scheduler).await.expect("poll");
        for _ in 0..200 {
            if registry.get(&id).await.expect("get").expect("present").status == gc_core::CaseStatus::Processed {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let n = retrieve::retrieve_once(&scheduler).await.expect("retrieve_once");
        assert_eq!(n, 1);

        let after = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(after.status, gc_core::CaseStatus::Received);
    }
}
