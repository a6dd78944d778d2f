//! Wires a `ResolvedConfig` into a running `Scheduler`: opens the registry
//! and archive, discovers adapters, builds the worker pool, and performs
//! the version handshake — grounded in the teacher's `startup_inner`
//! fail-fast-before-anything-else pattern (lock, then state, then listener;
//! here, registry open, then version check, then scheduler construction).

use std::collections::HashMap;
use std::sync::Arc;

use gc_archive::CaseArchive;
use gc_capability::ApplicationAdapter;
use gc_core::{ApplicationId, SystemClock, VersionVerdict};
use gc_registry::{CaseRegistry, EmbeddedRegistry};
use gc_scheduler::{Scheduler, SchedulerConfig};
use gc_workerpool::WorkerPool;
use tracing::{info, warn};

use crate::config::ResolvedConfig;
use crate::error::CliError;
use crate::paths;

/// Everything `gridctl` needs once configuration is resolved and the
/// version handshake has passed.
pub struct Context {
    pub registry: Arc<dyn CaseRegistry>,
    pub archive: CaseArchive,
    pub scheduler: Arc<Scheduler<SystemClock>>,
}

/// Default worker pool capacity; `gridctl agent run --capacity` overrides it.
pub const DEFAULT_CAPACITY: usize = 4;

pub async fn build(config: &ResolvedConfig, capacity: usize) -> Result<Context, CliError> {
    let state_dir = paths::state_dir()?;

    // The Case Registry is the one piece of cross-machine coordination
    // state; it lives under the shared folder, not per-machine local state.
    let registry_dir = config.shared_root.join("Registry");
    let registry: Arc<dyn CaseRegistry> = Arc::new(EmbeddedRegistry::open(&registry_dir).await?);

    version_handshake(registry.as_ref()).await?;

    let archive = CaseArchive::at(&config.shared_root);

    let mut adapters: HashMap<ApplicationId, Arc<dyn ApplicationAdapter>> = HashMap::new();
    for application in config.supported_applications() {
        if let Some(bundle) = config.bundle(&application) {
            adapters.insert(
                application.clone(),
                Arc::new(gc_adapters::SubprocessAdapter::from_bundle(application, bundle)),
            );
        }
    }

    let pool = Arc::new(WorkerPool::new(capacity, paths::scratch_root(&state_dir, &config.machine)));

    let scheduler_config = SchedulerConfig {
        machine: config.machine.clone(),
        user: config.user.clone(),
        user_group: config.user_group.clone(),
        instance: config.instance.clone(),
        supported_applications: config.supported_applications(),
        timing: config.timing,
        poll_interval: std::time::Duration::from_secs(3),
        jitter: 0.2,
        max_attempts: None,
    };

    let scheduler = Scheduler::new(
        scheduler_config,
        registry.clone(),
        archive.clone(),
        pool,
        adapters,
        SystemClock,
        paths::retrieval_root(&state_dir, &config.machine),
    )?;

    Ok(Context { registry, archive, scheduler })
}

/// REFUSED is fatal; WARNING logs and continues; ALLOWED/absent is silent.
async fn version_handshake(registry: &dyn CaseRegistry) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let verdict = registry.query_version(version).await?;
    match verdict {
        VersionVerdict::Refused { message } => {
            Err(CliError::VersionRefused { version: version.to_string(), message })
        }
        VersionVerdict::Warning { message } => {
            warn!(version, message = message.as_deref().unwrap_or(""), "version warning from the grid");
            Ok(())
        }
        VersionVerdict::Allowed => {
            info!(version, "version allowed");
            Ok(())
        }
        VersionVerdict::Uncontrolled => Ok(()),
    }
}
