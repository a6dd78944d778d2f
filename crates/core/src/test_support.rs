//! Test-only helpers: sample records and proptest strategies for the
//! invariant properties in the testable-properties section of the design.

use proptest::prelude::*;

use crate::ids::{ApplicationId, CaseId, Instance, MachineId, UserGroup, UserId};
use crate::record::{CaseRecord, CaseStatus, Origin, Processors};

/// A minimal, otherwise-valid case record ready for a `TO_PROCESS` claim
/// attempt.
pub fn sample_case(application: &str) -> CaseRecord {
    CaseRecord {
        id: CaseId::new(),
        user_group: UserGroup::from("eng"),
        instance: Instance::from("default"),
        application: ApplicationId::from(application),
        status: CaseStatus::ToProcess,
        path: format!("cases/u0/m0/{application}.zip"),
        origin: Origin {
            machine: MachineId::from("m0"),
            user: UserId::from("u0"),
            submitted_at: 0,
            received_at: None,
        },
        processors: Processors::default(),
        last_heartbeat: None,
    }
}

/// A strategy generating short lowercase identifier-like strings, suitable
/// for machine/user/application ids in property tests.
pub fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,8}"
}

/// A strategy over the four case statuses.
pub fn status_strategy() -> impl Strategy<Value = CaseStatus> {
    prop_oneof![
        Just(CaseStatus::ToProcess),
        Just(CaseStatus::Processing),
        Just(CaseStatus::Processed),
        Just(CaseStatus::Received),
    ]
}
