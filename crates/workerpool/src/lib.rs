// SPDX-License-Identifier: MIT

//! Worker Pool (WP): the local concurrency controller running adapter
//! invocations in isolated scratch directories under a user-adjustable
//! parallelism cap, with pause/resume/cancel.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod error;
mod job;
mod pool;

pub use error::WorkerPoolError;
pub use job::{CopyInputs, JobDescriptor, JobHandle, JobInput, JobOutcome};
pub use pool::WorkerPool;
