//! A real, if embedded, `CaseRegistry`. Stands in for "the document store" a
//! production deployment would point at a shared database: durable via an
//! append-only JSONL event log plus periodic snapshot, replayed on open.
//!
//! The CAS guarantee (I2) rests on two layers: a `tokio::sync::Mutex`
//! serializes concurrent callers within one process, and [`Wal::cas`]'s
//! exclusive flock serializes them across processes — the normal
//! deployment has one `EmbeddedRegistry` per `gridctl agent run`, all
//! rooted at the same shared Registry directory (see `gc-cli::startup`).
//! Every mutating call re-tails the log for other processes' appends,
//! checks its precondition against that now-current state, and only then
//! appends its own event, all while the file lock is held.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use gc_core::{
    ApplicationId, CaseId, CaseRecord, CaseStatus, Instance, MachineId, UserGroup, UserId,
    VersionRecord, VersionVerdict,
};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::error::RegistryError;
use crate::event::RegistryEventKind;
use crate::registry::CaseRegistry;
use crate::snapshot::{self, Snapshot};
use crate::state::{self, RegistryState};
use crate::wal::{self, Wal};

struct Inner {
    state: RegistryState,
    wal: Wal,
}

pub struct EmbeddedRegistry {
    inner: Arc<Mutex<Inner>>,
    dir: PathBuf,
}

impl EmbeddedRegistry {
    /// Open (or create) a registry directory: load the last snapshot if
    /// present, open the event log at the snapshot's `last_seq`, and
    /// replay anything unprocessed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let snapshot = snapshot::load(&dir).await?;
        let processed_seq = snapshot.as_ref().map(|s| s.last_seq).unwrap_or(0);
        let mut state = snapshot.map(|s| s.state).unwrap_or_default();

        let (wal, replay) = Wal::open(&wal::default_path(&dir), processed_seq).await?;
        for event in &replay {
            state::apply(&mut state, &event.kind);
        }
        if !replay.is_empty() {
            warn!(count = replay.len(), "replayed unprocessed registry events");
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { state, wal })),
            dir,
        })
    }

    /// Write a snapshot of the current state and truncate the event log.
    /// Intended to be called periodically by the owning process, not on
    /// every mutation.
    #[instrument(skip(self))]
    pub async fn checkpoint(&self) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        // Catch up with any other process's appends before snapshotting,
        // so the snapshot reflects the whole shared log, not just what
        // this handle happened to have seen.
        wal.cas(state, |_| None).await?;

        let snapshot = Snapshot { last_seq: wal.last_seq(), state: state.clone() };
        snapshot::write(&self.dir, &snapshot).await?;
        Wal::truncate(&wal::default_path(&self.dir)).await?;
        *wal = {
            let (wal, _) = Wal::open(&wal::default_path(&self.dir), snapshot.last_seq).await?;
            wal
        };
        Ok(())
    }
}

#[async_trait]
impl CaseRegistry for EmbeddedRegistry {
    #[instrument(skip(self, record), fields(case_id = %record.id))]
    async fn insert(&self, record: CaseRecord) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = record.id.clone();
        let id_for_err = id.clone();
        let applied = wal
            .cas(state, move |state| {
                if state.cases.contains_key(id.as_str()) {
                    None
                } else {
                    Some(RegistryEventKind::CaseInserted { record })
                }
            })
            .await?;
        if applied {
            Ok(())
        } else {
            Err(RegistryError::DuplicateId(id_for_err))
        }
    }

    #[instrument(skip(self))]
    async fn find_claimable(
        &self,
        user_group: &UserGroup,
        instance: &Instance,
        applications_supported: &[ApplicationId],
    ) -> Result<Vec<CaseRecord>, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        wal.cas(state, |_| None).await?;
        Ok(state
            .cases
            .values()
            .filter(|record| {
                record.status == CaseStatus::ToProcess
                    && record.visible_to(user_group, instance, applications_supported)
            })
            .cloned()
            .collect())
    }

    #[instrument(skip(self), fields(case_id = %id, machine = %machine))]
    async fn claim(
        &self,
        id: &CaseId,
        machine: &MachineId,
        user: &UserId,
        now: u64,
    ) -> Result<bool, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = id.clone();
        let machine = machine.clone();
        let user = user.clone();
        wal.cas(state, move |state| {
            let eligible = matches!(
                state.cases.get(id.as_str()),
                Some(record) if record.status == CaseStatus::ToProcess
            );
            eligible.then(|| RegistryEventKind::CaseClaimed {
                id: id.clone(),
                machine: machine.clone(),
                user: user.clone(),
                now,
            })
        })
        .await
    }

    #[instrument(skip(self), fields(case_id = %id, machine = %machine))]
    async fn heartbeat(
        &self,
        id: &CaseId,
        machine: &MachineId,
        user: &UserId,
        now: u64,
    ) -> Result<bool, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = id.clone();
        let machine = machine.clone();
        let user = user.clone();
        wal.cas(state, move |state| {
            let matches_current = matches!(
                state.cases.get(id.as_str()),
                Some(record)
                    if record.status == CaseStatus::Processing
                        && record.processors.current.as_ref().is_some_and(|c| c.matches(&machine, &user))
            );
            matches_current.then(|| RegistryEventKind::Heartbeat { id: id.clone(), now })
        })
        .await
    }

    #[instrument(skip(self), fields(case_id = %id, machine = %machine))]
    async fn complete(
        &self,
        id: &CaseId,
        machine: &MachineId,
        user: &UserId,
        now: u64,
    ) -> Result<bool, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = id.clone();
        let machine = machine.clone();
        let user = user.clone();
        wal.cas(state, move |state| {
            let matches_current = matches!(
                state.cases.get(id.as_str()),
                Some(record)
                    if record.status == CaseStatus::Processing
                        && record.processors.current.as_ref().is_some_and(|c| c.matches(&machine, &user))
            );
            matches_current.then(|| RegistryEventKind::CaseCompleted { id: id.clone(), now })
        })
        .await
    }

    #[instrument(skip(self), fields(case_id = %id))]
    async fn reclaim(&self, id: &CaseId, now: u64, grace_ms: u64) -> Result<bool, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = id.clone();
        wal.cas(state, move |state| {
            let stale = matches!(
                state.cases.get(id.as_str()),
                Some(record)
                    if record.status == CaseStatus::Processing
                        && record.last_heartbeat.is_some_and(|hb| now.saturating_sub(hb) > grace_ms)
            );
            stale.then(|| RegistryEventKind::CaseReclaimed { id: id.clone(), now })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_reclaimable(&self, now: u64, grace_ms: u64) -> Result<Vec<CaseRecord>, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        wal.cas(state, |_| None).await?;
        Ok(state
            .cases
            .values()
            .filter(|record| {
                record.status == CaseStatus::Processing
                    && record.last_heartbeat.is_some_and(|hb| now.saturating_sub(hb) > grace_ms)
            })
            .cloned()
            .collect())
    }

    #[instrument(skip(self), fields(case_id = %id))]
    async fn mark_received(&self, id: &CaseId, now: u64) -> Result<bool, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = id.clone();
        wal.cas(state, move |state| {
            let processed = matches!(
                state.cases.get(id.as_str()),
                Some(record) if record.status == CaseStatus::Processed
            );
            processed.then(|| RegistryEventKind::CaseReceived { id: id.clone(), now })
        })
        .await
    }

    #[instrument(skip(self), fields(case_id = %id))]
    async fn delete(&self, id: &CaseId) -> Result<bool, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        let id = id.clone();
        wal.cas(state, move |state| {
            state
                .cases
                .contains_key(id.as_str())
                .then(|| RegistryEventKind::CaseDeleted { id: id.clone() })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_receivable(
        &self,
        machine: &MachineId,
        user: &UserId,
    ) -> Result<Vec<CaseRecord>, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        wal.cas(state, |_| None).await?;
        Ok(state
            .cases
            .values()
            .filter(|record| {
                record.status == CaseStatus::Processed
                    && &record.origin.machine == machine
                    && &record.origin.user == user
            })
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn query_version(&self, version: &str) -> Result<VersionVerdict, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        wal.cas(state, |_| None).await?;
        let record: Option<&VersionRecord> = state.versions.get(version);
        Ok(VersionVerdict::from_record(record))
    }

    async fn get(&self, id: &CaseId) -> Result<Option<CaseRecord>, RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        wal.cas(state, |_| None).await?;
        Ok(state.cases.get(id.as_str()).cloned())
    }

    #[instrument(skip(self, record), fields(version = %record.id))]
    async fn set_version(&self, record: VersionRecord) -> Result<(), RegistryError> {
        let mut guard = self.inner.lock().await;
        let Inner { state, wal } = &mut *guard;
        wal.cas(state, move |_| Some(RegistryEventKind::VersionSet { record })).await?;
        Ok(())
    }
}
