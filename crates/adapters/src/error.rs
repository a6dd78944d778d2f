use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    NonZeroExit {
        program: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("malformed protocol message from {program}: {source}")]
    Protocol {
        program: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error talking to {program}: {source}")]
    Io {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<SubprocessError> for gc_capability::AdapterError {
    fn from(err: SubprocessError) -> Self {
        gc_capability::AdapterError::Failed(err.to_string())
    }
}
