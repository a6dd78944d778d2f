//! The case record: the single document-shaped unit of coordination state
//! that lives in the Case Registry.

use serde::{Deserialize, Serialize};

use crate::ids::{ApplicationId, CaseId, Instance, MachineId, UserGroup, UserId};
use crate::simple_display;

/// `status` transitions follow exactly `TO_PROCESS -> PROCESSING -> PROCESSED
/// -> RECEIVED`, with the sole backward edge `PROCESSING -> TO_PROCESS`
/// (reclamation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    ToProcess,
    Processing,
    Processed,
    Received,
}

simple_display!(CaseStatus {
    ToProcess => "TO_PROCESS",
    Processing => "PROCESSING",
    Processed => "PROCESSED",
    Received => "RECEIVED",
});

impl CaseStatus {
    /// Whether `next` is a legal successor of `self` under I1.
    pub fn can_transition_to(self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        matches!(
            (self, next),
            (ToProcess, Processing)
                | (Processing, Processed)
                | (Processed, Received)
                | (Processing, ToProcess)
        )
    }
}

/// One entry in the append-only `attempts` history: a processor identity
/// recorded the moment it claimed the case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorAttempt {
    pub machine: MachineId,
    pub user: UserId,
}

impl ProcessorAttempt {
    pub fn new(machine: MachineId, user: UserId) -> Self {
        Self { machine, user }
    }
}

/// The live claim on a case currently `PROCESSING`, or `None` otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentProcessor {
    pub machine: MachineId,
    pub user: UserId,
    pub started_at: u64,
    pub ended_at: Option<u64>,
}

impl CurrentProcessor {
    pub fn matches(&self, machine: &MachineId, user: &UserId) -> bool {
        &self.machine == machine && &self.user == user
    }
}

/// `attempts` is append-only (P6); `current` holds the live claim, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processors {
    pub attempts: Vec<ProcessorAttempt>,
    pub current: Option<CurrentProcessor>,
}

impl Processors {
    pub fn claim(&mut self, machine: MachineId, user: UserId, now: u64) {
        self.attempts.push(ProcessorAttempt::new(machine.clone(), user.clone()));
        self.current = Some(CurrentProcessor {
            machine,
            user,
            started_at: now,
            ended_at: None,
        });
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn end_current(&mut self, now: u64) {
        if let Some(current) = &mut self.current {
            current.ended_at = Some(now);
        }
    }
}

/// Submission and retrieval provenance for a case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub machine: MachineId,
    pub user: UserId,
    pub submitted_at: u64,
    pub received_at: Option<u64>,
}

/// One record per submitted case; lives in the Case Registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: CaseId,
    pub user_group: UserGroup,
    pub instance: Instance,
    pub application: ApplicationId,
    pub status: CaseStatus,
    /// Logical location within the Case Archive of the input (and, once
    /// produced, output) archives.
    pub path: String,
    pub origin: Origin,
    pub processors: Processors,
    /// Only meaningful while `status == Processing`.
    pub last_heartbeat: Option<u64>,
}

impl CaseRecord {
    /// Whether `machine`/`group`/`instance`/`application` may see this case
    /// for processing purposes, per invariant I5.
    pub fn visible_to(
        &self,
        user_group: &UserGroup,
        instance: &Instance,
        supported_applications: &[ApplicationId],
    ) -> bool {
        &self.user_group == user_group
            && &self.instance == instance
            && supported_applications.contains(&self.application)
    }
}

crate::builder!(
    pub struct CaseRecordBuilder => CaseRecord {
        into {
            id: CaseId = CaseId::new(),
            user_group: UserGroup = "default",
            instance: Instance = "default",
            application: ApplicationId = "noop",
            path: String = String::new(),
        }
        set {
            status: CaseStatus = CaseStatus::ToProcess,
            origin: Origin = Origin {
                machine: MachineId::from("m0"),
                user: UserId::from("u0"),
                submitted_at: 0,
                received_at: None,
            },
            processors: Processors = Processors::default(),
            last_heartbeat: Option<u64> = None,
        }
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_allows_only_i1_transitions() {
        assert!(CaseStatus::ToProcess.can_transition_to(CaseStatus::Processing));
        assert!(CaseStatus::Processing.can_transition_to(CaseStatus::Processed));
        assert!(CaseStatus::Processed.can_transition_to(CaseStatus::Received));
        assert!(CaseStatus::Processing.can_transition_to(CaseStatus::ToProcess));
        assert!(!CaseStatus::ToProcess.can_transition_to(CaseStatus::Processed));
        assert!(!CaseStatus::Received.can_transition_to(CaseStatus::ToProcess));
    }

    #[test]
    fn processors_claim_appends_and_sets_current() {
        let mut p = Processors::default();
        p.claim(MachineId::from("m1"), UserId::from("u1"), 10);
        assert_eq!(p.attempts.len(), 1);
        assert!(p.current.as_ref().unwrap().matches(&"m1".into(), &"u1".into()));
    }

    #[test]
    fn reclaim_preserves_attempts_but_clears_current() {
        let mut p = Processors::default();
        p.claim(MachineId::from("m1"), UserId::from("u1"), 10);
        p.clear_current();
        assert_eq!(p.attempts.len(), 1);
        assert!(p.current.is_none());
    }

    #[test]
    fn visibility_requires_group_instance_and_capability() {
        let record = CaseRecord::builder()
            .user_group("eng")
            .instance("prod")
            .application("render")
            .build();
        assert!(record.visible_to(&"eng".into(), &"prod".into(), &["render".into()]));
        assert!(!record.visible_to(&"eng".into(), &"debug".into(), &["render".into()]));
        assert!(!record.visible_to(&"eng".into(), &"prod".into(), &["encode".into()]));
    }
}
