use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerPoolError {
    #[error("scratch directory error at {path}: {source}")]
    Scratch {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker pool is paused")]
    Paused,

    #[error(transparent)]
    Adapter(#[from] gc_capability::AdapterError),
}
