//! The CLI error boundary: `thiserror` below, `anyhow` at `main`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Capability(#[from] gc_capability::CapabilityError),

    #[error(transparent)]
    Registry(#[from] gc_registry::RegistryError),

    #[error(transparent)]
    Archive(#[from] gc_archive::CaArchiveError),

    #[error(transparent)]
    Scheduler(#[from] gc_scheduler::SchedulerError),

    #[error("this build ({version}) was refused by the grid")]
    VersionRefused { version: String, message: Option<String> },

    #[error("no such case {0}")]
    CaseNotFound(gc_core::CaseId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
