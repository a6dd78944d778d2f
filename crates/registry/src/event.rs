//! The event-sourced record of every CAS transition a case record goes
//! through. Replayed on open exactly like a write-ahead log.

use gc_core::{CaseId, CaseRecord, MachineId, UserId, VersionRecord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RegistryEventKind {
    CaseInserted { record: CaseRecord },
    CaseClaimed { id: CaseId, machine: MachineId, user: UserId, now: u64 },
    Heartbeat { id: CaseId, now: u64 },
    CaseCompleted { id: CaseId, now: u64 },
    CaseReclaimed { id: CaseId, now: u64 },
    CaseReceived { id: CaseId, now: u64 },
    CaseDeleted { id: CaseId },
    /// Administrative: sets (or replaces) a `versions` collection record.
    /// Not written by any protocol duty — an operator/admin tool path.
    VersionSet { record: VersionRecord },
}

/// One line in the on-disk event log: a monotonic sequence number plus the
/// event it assigns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub seq: u64,
    pub kind: RegistryEventKind,
}
