//! The single-document operations every Case Registry implementation must
//! provide. All cross-machine coordination collapses into four
//! compare-and-set primitives: `claim`, `heartbeat`, `complete`, `reclaim`.

use async_trait::async_trait;
use gc_core::{
    ApplicationId, CaseId, CaseRecord, Instance, MachineId, UserGroup, UserId, VersionRecord, VersionVerdict,
};

use crate::error::RegistryError;

#[async_trait]
pub trait CaseRegistry: Send + Sync {
    /// Rejects duplicate ids.
    async fn insert(&self, record: CaseRecord) -> Result<(), RegistryError>;

    /// Records with `status = TO_PROCESS` whose `application` is in
    /// `applications_supported`, visible to `user_group`/`instance`.
    /// Ordering is unspecified but must be fair enough that any eligible
    /// case is eventually returned to any eligible caller.
    async fn find_claimable(
        &self,
        user_group: &UserGroup,
        instance: &Instance,
        applications_supported: &[ApplicationId],
    ) -> Result<Vec<CaseRecord>, RegistryError>;

    /// Atomic CAS: succeeds only if the record is currently `TO_PROCESS`.
    async fn claim(
        &self,
        id: &CaseId,
        machine: &MachineId,
        user: &UserId,
        now: u64,
    ) -> Result<bool, RegistryError>;

    /// Succeeds only if the record is `PROCESSING` and `current` matches
    /// `machine`/`user`.
    async fn heartbeat(
        &self,
        id: &CaseId,
        machine: &MachineId,
        user: &UserId,
        now: u64,
    ) -> Result<bool, RegistryError>;

    /// Atomic; requires `PROCESSING` with matching `current`.
    async fn complete(
        &self,
        id: &CaseId,
        machine: &MachineId,
        user: &UserId,
        now: u64,
    ) -> Result<bool, RegistryError>;

    /// Atomic; succeeds only if the record is `PROCESSING` AND
    /// `now - last_heartbeat > grace_ms`.
    async fn reclaim(&self, id: &CaseId, now: u64, grace_ms: u64) -> Result<bool, RegistryError>;

    /// Records with `status = PROCESSING` whose `last_heartbeat` is stale,
    /// i.e. `now - last_heartbeat > grace_ms`. Feeds the reclamation duty's
    /// scan; each candidate still goes through `reclaim`'s own CAS check.
    async fn find_reclaimable(&self, now: u64, grace_ms: u64) -> Result<Vec<CaseRecord>, RegistryError>;

    /// Requires `PROCESSED`; transitions to `RECEIVED`.
    async fn mark_received(&self, id: &CaseId, now: u64) -> Result<bool, RegistryError>;

    /// Records with `status = PROCESSED` originated by `machine`/`user`.
    /// Feeds the result-retrieval duty's scan.
    async fn find_receivable(
        &self,
        machine: &MachineId,
        user: &UserId,
    ) -> Result<Vec<CaseRecord>, RegistryError>;

    /// Originator-only; typically called after `mark_received`.
    async fn delete(&self, id: &CaseId) -> Result<bool, RegistryError>;

    /// `Uncontrolled` if the versions collection/record is absent.
    async fn query_version(&self, version: &str) -> Result<VersionVerdict, RegistryError>;

    /// Administrative: sets (or replaces) a `versions` collection record.
    /// Not called by any protocol duty; an ops tool writes this directly.
    async fn set_version(&self, record: VersionRecord) -> Result<(), RegistryError>;

    /// Read-only lookup, used by status projections and result retrieval.
    async fn get(&self, id: &CaseId) -> Result<Option<CaseRecord>, RegistryError>;
}
