//! Property tests for the invariants a concurrent multi-machine simulation
//! must never violate.

use gc_core::test_support::sample_case;
use gc_core::{CaseStatus, MachineId, UserId};
use gc_registry::{CaseRegistry, EmbeddedRegistry};
use proptest::prelude::*;

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

proptest! {
    /// P1: the observed status sequence is a prefix of
    /// TO_PROCESS, PROCESSING, PROCESSED, RECEIVED, with the sole exception
    /// that PROCESSING -> TO_PROCESS may appear.
    #[test]
    fn p1_status_only_ever_moves_along_legal_edges(
        claim_then_reclaim in proptest::bool::ANY,
    ) {
        rt().block_on(async move {
            let dir = tempfile::tempdir().expect("tempdir");
            let registry = EmbeddedRegistry::open(dir.path()).await.expect("open");
            let record = sample_case("render");
            let id = record.id.clone();
            registry.insert(record).await.expect("insert");

            let machine = MachineId::from("m1");
            let user = UserId::from("u1");
            let mut observed = vec![CaseStatus::ToProcess];

            assert!(registry.claim(&id, &machine, &user, 0).await.expect("claim"));
            observed.push(CaseStatus::Processing);

            if claim_then_reclaim {
                assert!(registry.reclaim(&id, 1_000, 1).await.expect("reclaim"));
                observed.push(CaseStatus::ToProcess);
                assert!(registry.claim(&id, &machine, &user, 1_001).await.expect("reclaim"));
                observed.push(CaseStatus::Processing);
            }

            assert!(registry.complete(&id, &machine, &user, 2_000).await.expect("complete"));
            observed.push(CaseStatus::Processed);
            assert!(registry.mark_received(&id, 3_000).await.expect("receive"));
            observed.push(CaseStatus::Received);

            for window in observed.windows(2) {
                assert!(window[0].can_transition_to(window[1]));
            }
        });
    }

    /// P6: `attempts` is append-only across any number of claim/reclaim
    /// cycles.
    #[test]
    fn p6_attempts_never_shrinks(cycles in 0u32..5) {
        rt().block_on(async move {
            let dir = tempfile::tempdir().expect("tempdir");
            let registry = EmbeddedRegistry::open(dir.path()).await.expect("open");
            let record = sample_case("render");
            let id = record.id.clone();
            registry.insert(record).await.expect("insert");

            let user = UserId::from("u1");
            let mut now = 0u64;
            let mut previous_len = 0usize;

            for i in 0..=cycles {
                let machine = MachineId::from(format!("m{i}").as_str());
                assert!(registry.claim(&id, &machine, &user, now).await.expect("claim"));
                let record = registry.get(&id).await.expect("get").expect("present");
                assert!(record.processors.attempts.len() > previous_len);
                previous_len = record.processors.attempts.len();

                now += 1_000;
                if i < cycles {
                    assert!(registry.reclaim(&id, now, 1).await.expect("reclaim"));
                    let record = registry.get(&id).await.expect("get").expect("present");
                    assert_eq!(record.processors.attempts.len(), previous_len);
                }
            }
        });
    }
}

/// R2: `mark_received` is idempotent at the database level — the second
/// call returns false but leaves the record unchanged.
#[test]
fn r2_mark_received_is_idempotent() {
    rt().block_on(async move {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = EmbeddedRegistry::open(dir.path()).await.expect("open");
        let record = sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let machine = MachineId::from("m1");
        let user = UserId::from("u1");
        registry.claim(&id, &machine, &user, 0).await.expect("claim");
        registry.complete(&id, &machine, &user, 10).await.expect("complete");

        assert!(registry.mark_received(&id, 20).await.expect("first"));
        let before = registry.get(&id).await.expect("get").expect("present");
        assert!(!registry.mark_received(&id, 30).await.expect("second"));
        let after = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(before, after);
    });
}
