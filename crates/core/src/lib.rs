// SPDX-License-Identifier: MIT

//! Domain types, ids, clock abstraction, and error vocabulary shared by
//! every GridCompute crate.
//!
//! Nothing in here talks to a filesystem, a database, or a subprocess —
//! those are the jobs of `gc-archive`, `gc-registry`, and `gc-adapters`
//! respectively. This crate only defines the shapes those crates agree on.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod macros;
pub mod clock;
pub mod error;
pub mod id;
pub mod ids;
pub mod record;
pub mod timing;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::GridError;
pub use id::{IdBuf, ID_MAX_LEN};
pub use ids::{ApplicationId, CaseId, Instance, MachineId, UserGroup, UserId};
pub use record::{
    CaseRecord, CaseStatus, CurrentProcessor, Origin, ProcessorAttempt, Processors,
};
pub use timing::{parse_duration, Timing, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_RECLAMATION_GRACE};
pub use version::{VersionRecord, VersionStatus, VersionVerdict};
