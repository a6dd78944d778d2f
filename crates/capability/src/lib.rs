// SPDX-License-Identifier: MIT

//! Capability Index (CI): a read-only snapshot of which machines can
//! execute which applications, and of the locally present adapter bundles.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod adapter;
mod discovery;
mod error;
mod index;
mod matrix;

pub use adapter::{AdapterError, ApplicationAdapter, InputBundleSpec};
pub use discovery::{scan_applications, AdapterBundle};
pub use error::CapabilityError;
pub use index::CapabilityIndex;
pub use matrix::CapabilityMatrix;
