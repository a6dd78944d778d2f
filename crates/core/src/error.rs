//! Error vocabulary shared across every GridCompute crate.
//!
//! The grid protocol prefers silence over escalation: only startup-phase
//! errors and explicit user-facing commands propagate past the scheduler's
//! own retry loops. [`GridError`] names the kinds the rest of the codebase
//! reasons about; component-specific error enums (e.g. `RegistryError`,
//! `CaArchiveError`) wrap a subset of these and convert into `GridError` at
//! crate boundaries.

use std::path::PathBuf;

use thiserror::Error;

/// The error kinds from the error handling design: fatal startup failures,
/// transient conditions absorbed by retry loops, and permanent per-case
/// failures left for reclamation to resolve.
#[derive(Debug, Error)]
pub enum GridError {
    /// Malformed settings, missing shared folder, missing adapter. Fatal at
    /// startup.
    #[error("config invalid: {0}")]
    ConfigInvalid(String),

    /// A `versions` record marked this build `REFUSED`. Fatal at startup.
    #[error("version {version} refused by the grid")]
    VersionRefused { version: String },

    /// Logged and retried with backoff by the scheduler's own loops; never
    /// surfaced to case state directly.
    #[error("transient I/O error at {path}: {source}")]
    TransientIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A specific case is left untouched; reclamation handles liveness.
    #[error("permanent I/O error at {path}: {source}")]
    PermanentIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Logged and retried with backoff; never surfaced to case state
    /// directly.
    #[error("transient registry error: {0}")]
    TransientDb(String),

    /// A specific case is left untouched; reclamation handles liveness.
    #[error("permanent registry error: {0}")]
    PermanentDb(String),

    /// Local diagnostic captured; the case will be reclaimed and retried by
    /// another (or the same) machine after the grace period.
    #[error("adapter {application} failed: {detail}")]
    AdapterFailed { application: String, detail: String },

    /// A heartbeat or completion call returned false: the processor's claim
    /// was reclaimed out from under it. Not user-visible; the grid is
    /// self-healing.
    #[error("claim lost")]
    ClaimLost,
}

impl GridError {
    /// Whether this error belongs to a retry loop (transient) as opposed to
    /// one that leaves the case for reclamation to resolve (permanent/fatal).
    pub fn is_transient(&self) -> bool {
        matches!(self, GridError::TransientIo { .. } | GridError::TransientDb(_))
    }
}
