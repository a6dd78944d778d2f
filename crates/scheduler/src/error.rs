use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler configuration: {0}")]
    Config(#[from] gc_core::GridError),

    #[error("registry error: {0}")]
    Registry(#[from] gc_registry::RegistryError),

    #[error("archive error: {0}")]
    Archive(#[from] gc_archive::CaArchiveError),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] gc_workerpool::WorkerPoolError),

    #[error("adapter error: {0}")]
    Adapter(#[from] gc_capability::AdapterError),

    #[error("no adapter registered for application {0}")]
    UnknownApplication(gc_core::ApplicationId),

    #[error("{0}")]
    Internal(String),
}
