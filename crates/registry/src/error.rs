use thiserror::Error;

/// Per §7: transient registry errors are retried with backoff by the
/// scheduler's own loops; permanent ones leave the case untouched for
/// reclamation to resolve.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("transient registry error: {0}")]
    Transient(String),

    #[error("permanent registry error: {0}")]
    Permanent(String),

    #[error("case {0} already exists")]
    DuplicateId(gc_core::CaseId),
}

impl From<RegistryError> for gc_core::GridError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Transient(msg) => gc_core::GridError::TransientDb(msg),
            RegistryError::Permanent(msg) => gc_core::GridError::PermanentDb(msg),
            RegistryError::DuplicateId(id) => {
                gc_core::GridError::PermanentDb(format!("duplicate case id {id}"))
            }
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            Interrupted | WouldBlock | TimedOut => RegistryError::Transient(err.to_string()),
            _ => RegistryError::Permanent(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Permanent(format!("corrupt registry record: {err}"))
    }
}

impl From<tokio::task::JoinError> for RegistryError {
    fn from(err: tokio::task::JoinError) -> Self {
        RegistryError::Permanent(format!("WAL blocking task panicked: {err}"))
    }
}
