//! Scheduler timing knobs, constructed from `gc-cli`'s `ConfigProvider` and
//! validated at construction (B1).

use std::time::Duration;

use gc_core::{ApplicationId, GridError, Instance, MachineId, Timing, UserGroup, UserId};

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub machine: MachineId,
    pub user: UserId,
    pub user_group: UserGroup,
    pub instance: Instance,
    pub supported_applications: Vec<ApplicationId>,
    pub timing: Timing,
    /// Base interval for the poll/claim loop. Recommended: a few seconds.
    pub poll_interval: Duration,
    /// Jitter applied to `poll_interval` and the reclamation scan, as a
    /// fraction of the base interval (0.2 == ±20%).
    pub jitter: f64,
    /// Operator knob for an attempt cap; `None` means uncapped, matching
    /// the core's default (the `attempts` list grows monotonically with no
    /// built-in limit).
    pub max_attempts: Option<u32>,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), GridError> {
        self.timing.validate()
    }
}
