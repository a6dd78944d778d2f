use std::path::PathBuf;

use thiserror::Error;

/// CA never retries internally (§4.1) — callers decide what to do with a
/// transient error; a permanent one is surfaced as-is.
#[derive(Debug, Error)]
pub enum CaArchiveError {
    #[error("transient I/O error at {path}: {source}")]
    Transient {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("permanent I/O error at {path}: {source}")]
    Permanent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaArchiveError {
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match source.kind() {
            Interrupted | WouldBlock | TimedOut => CaArchiveError::Transient { path, source },
            _ => CaArchiveError::Permanent { path, source },
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, CaArchiveError::Transient { .. })
    }
}

impl From<CaArchiveError> for gc_core::GridError {
    fn from(err: CaArchiveError) -> Self {
        match err {
            CaArchiveError::Transient { path, source } => gc_core::GridError::TransientIo { path, source },
            CaArchiveError::Permanent { path, source } => gc_core::GridError::PermanentIo { path, source },
        }
    }
}
