use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("malformed capability matrix: {0}")]
    MalformedMatrix(String),

    #[error("application id {0:?} is invalid: must be non-empty and must not contain '.'")]
    InvalidApplicationId(String),

    #[error("io error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<CapabilityError> for gc_core::GridError {
    fn from(err: CapabilityError) -> Self {
        gc_core::GridError::ConfigInvalid(err.to_string())
    }
}
