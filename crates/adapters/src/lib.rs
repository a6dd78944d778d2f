// SPDX-License-Identifier: MIT

//! Concrete `ApplicationAdapter` implementations: a subprocess-based
//! adapter for production use, and closure-backed fakes for tests.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod error;
mod protocol;
mod subprocess;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use error::SubprocessError;
pub use subprocess::SubprocessAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAdapter;
