//! The in-memory materialized view: one `apply(state, event)` function per
//! entity, each a pure state transition driven by the event enum. By the
//! time an event reaches `apply`, its precondition has already been checked
//! by the caller — `apply` exists so that live mutation and log replay share
//! exactly one code path.

use std::collections::HashMap;

use gc_core::{CaseRecord, CaseStatus, VersionRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event::RegistryEventKind;

/// `cases` is an `IndexMap` (not a `HashMap`) so `find_claimable` can return
/// candidates in insertion order — id order is fair enough per §4.2.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub cases: IndexMap<String, CaseRecord>,
    pub versions: HashMap<String, VersionRecord>,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn apply(state: &mut RegistryState, event: &RegistryEventKind) {
    match event {
        RegistryEventKind::CaseInserted { record } => {
            state.cases.insert(record.id.as_str().to_string(), record.clone());
        }
        RegistryEventKind::CaseClaimed { id, machine, user, now } => {
            if let Some(record) = state.cases.get_mut(id.as_str()) {
                record.status = CaseStatus::Processing;
                record.processors.claim(machine.clone(), user.clone(), *now);
                record.last_heartbeat = Some(*now);
            }
        }
        RegistryEventKind::Heartbeat { id, now } => {
            if let Some(record) = state.cases.get_mut(id.as_str()) {
                record.last_heartbeat = Some(*now);
            }
        }
        RegistryEventKind::CaseCompleted { id, now } => {
            if let Some(record) = state.cases.get_mut(id.as_str()) {
                record.status = CaseStatus::Processed;
                record.processors.end_current(*now);
            }
        }
        RegistryEventKind::CaseReclaimed { id, now: _ } => {
            if let Some(record) = state.cases.get_mut(id.as_str()) {
                record.status = CaseStatus::ToProcess;
                record.processors.clear_current();
                record.last_heartbeat = None;
            }
        }
        RegistryEventKind::CaseReceived { id, now } => {
            if let Some(record) = state.cases.get_mut(id.as_str()) {
                record.status = CaseStatus::Received;
                record.origin.received_at = Some(*now);
            }
        }
        RegistryEventKind::CaseDeleted { id } => {
            state.cases.shift_remove(id.as_str());
        }
        RegistryEventKind::VersionSet { record } => {
            state.versions.insert(record.id.clone(), record.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::test_support::sample_case;
    use gc_core::{MachineId, UserId};

    #[test]
    fn claim_then_reclaim_preserves_attempts() {
        let mut state = RegistryState::new();
        let record = sample_case("render");
        let id = record.id.clone();
        apply(&mut state, &RegistryEventKind::CaseInserted { record });

        apply(
            &mut state,
            &RegistryEventKind::CaseClaimed {
                id: id.clone(),
                machine: MachineId::from("m1"),
                user: UserId::from("u1"),
                now: 10,
            },
        );
        let claimed = state.cases.get(id.as_str()).unwrap();
        assert_eq!(claimed.status, CaseStatus::Processing);
        assert_eq!(claimed.processors.attempts.len(), 1);

        apply(&mut state, &RegistryEventKind::CaseReclaimed { id: id.clone(), now: 200 });
        let reclaimed = state.cases.get(id.as_str()).unwrap();
        assert_eq!(reclaimed.status, CaseStatus::ToProcess);
        assert_eq!(reclaimed.processors.attempts.len(), 1);
        assert!(reclaimed.processors.current.is_none());
    }

    #[test]
    fn delete_removes_the_record() {
        let mut state = RegistryState::new();
        let record = sample_case("render");
        let id = record.id.clone();
        apply(&mut state, &RegistryEventKind::CaseInserted { record });
        apply(&mut state, &RegistryEventKind::CaseDeleted { id: id.clone() });
        assert!(state.cases.get(id.as_str()).is_none());
    }
}
