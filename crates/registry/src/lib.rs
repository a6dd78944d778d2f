// SPDX-License-Identifier: MIT

//! Case Registry (CR): durable case records with single-document atomic
//! conditional updates.
//!
//! The core protocol only needs the operations in [`CaseRegistry`] — a
//! production deployment points them at a shared document database. This
//! crate also ships [`EmbeddedRegistry`], a real (if single-writer)
//! implementation backed by an append-only event log and periodic
//! snapshot, so the rest of the workspace can run and be tested without an
//! external service.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod embedded;
mod error;
mod event;
mod registry;
mod snapshot;
mod state;
mod wal;

pub use embedded::EmbeddedRegistry;
pub use error::RegistryError;
pub use event::{RegistryEvent, RegistryEventKind};
pub use registry::CaseRegistry;
pub use snapshot::Snapshot;
pub use state::RegistryState;

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::test_support::sample_case;
    use gc_core::{MachineId, UserId};

    async fn open_registry() -> (EmbeddedRegistry, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = EmbeddedRegistry::open(dir.path()).await.expect("open");
        (registry, dir)
    }

    #[tokio::test]
    async fn claim_is_exclusive_p2() {
        let (registry, _dir) = open_registry().await;
        let record = sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let m1 = MachineId::from("m1");
        let m2 = MachineId::from("m2");
        let u1 = UserId::from("u1");
        let u2 = UserId::from("u2");

        let a = registry.claim(&id, &m1, &u1, 0).await.expect("claim a");
        let b = registry.claim(&id, &m2, &u2, 0).await.expect("claim b");
        assert!(a);
        assert!(!b, "only one machine may hold the claim (I2)");
    }

    #[tokio::test]
    async fn heartbeat_fails_once_reclaimed() {
        let (registry, _dir) = open_registry().await;
        let record = sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let machine = MachineId::from("m1");
        let user = UserId::from("u1");
        registry.claim(&id, &machine, &user, 0).await.expect("claim");

        assert!(registry.reclaim(&id, 1_000, 500).await.expect("reclaim"));
        assert!(!registry
            .heartbeat(&id, &machine, &user, 1_001)
            .await
            .expect("heartbeat after reclaim"));
    }

    #[tokio::test]
    async fn mark_received_is_idempotent_r2() {
        let (registry, _dir) = open_registry().await;
        let record = sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let machine = MachineId::from("m1");
        let user = UserId::from("u1");
        registry.claim(&id, &machine, &user, 0).await.expect("claim");
        registry.complete(&id, &machine, &user, 10).await.expect("complete");

        assert!(registry.mark_received(&id, 20).await.expect("first receive"));
        let after_first = registry.get(&id).await.expect("get").expect("present");
        assert!(!registry.mark_received(&id, 30).await.expect("second receive"));
        let after_second = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(after_first, after_second, "second call leaves the record unchanged");
    }

    #[tokio::test]
    async fn attempts_append_only_across_claim_reclaim_cycles_p6() {
        let (registry, _dir) = open_registry().await;
        let record = sample_case("render");
        let id = record.id.clone();
        registry.insert(record).await.expect("insert");

        let m1 = MachineId::from("m1");
        let m2 = MachineId::from("m2");
        let u = UserId::from("u1");

        registry.claim(&id, &m1, &u, 0).await.expect("claim 1");
        registry.reclaim(&id, 1_000, 100).await.expect("reclaim");
        registry.claim(&id, &m2, &u, 1_100).await.expect("claim 2");

        let record = registry.get(&id).await.expect("get").expect("present");
        assert_eq!(record.processors.attempts.len(), 2);
        assert_eq!(record.processors.attempts[0].machine, m1);
        assert_eq!(record.processors.attempts[1].machine, m2);
    }

    #[tokio::test]
    async fn state_survives_reopen_via_event_replay() {
        let dir = tempfile::tempdir().expect("tempdir");
        let id;
        {
            let registry = EmbeddedRegistry::open(dir.path()).await.expect("open");
            let record = sample_case("render");
            id = record.id.clone();
            registry.insert(record).await.expect("insert");
            registry
                .claim(&id, &MachineId::from("m1"), &UserId::from("u1"), 0)
                .await
                .expect("claim");
        }

        let reopened = EmbeddedRegistry::open(dir.path()).await.expect("reopen");
        let record = reopened.get(&id).await.expect("get").expect("present");
        assert_eq!(record.status, gc_core::CaseStatus::Processing);
    }

    #[tokio::test]
    async fn checkpoint_then_reopen_preserves_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let id;
        {
            let registry = EmbeddedRegistry::open(dir.path()).await.expect("open");
            let record = sample_case("render");
            id = record.id.clone();
            registry.insert(record).await.expect("insert");
            registry.checkpoint().await.expect("checkpoint");
        }

        let reopened = EmbeddedRegistry::open(dir.path()).await.expect("reopen");
        assert!(reopened.get(&id).await.expect("get").is_some());
    }

    #[tokio::test]
    async fn version_query_is_uncontrolled_until_a_record_is_set() {
        let (registry, _dir) = open_registry().await;
        assert_eq!(
            registry.query_version("1.0.0").await.expect("query"),
            gc_core::VersionVerdict::Uncontrolled
        );

        registry
            .set_version(gc_core::VersionRecord {
                id: "1.0.0".into(),
                status: gc_core::VersionStatus::Refused,
                message: Some("too old".into()),
            })
            .await
            .expect("set_version");

        let verdict = registry.query_version("1.0.0").await.expect("query");
        assert!(verdict.is_fatal());
    }
}
