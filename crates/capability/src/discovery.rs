//! Scans `Settings/Applications/<id>/{send,process,receive}` for locally
//! present adapter bundles. Construction of the actual `ApplicationAdapter`
//! objects from these paths is left to `gc-adapters`, which depends on this
//! crate rather than the other way around.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gc_core::ApplicationId;

use crate::error::CapabilityError;

/// The three executable paths backing one application id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterBundle {
    pub send: PathBuf,
    pub process: PathBuf,
    pub receive: PathBuf,
}

/// Scan `applications_dir` for subdirectories containing all three of
/// `send`, `process`, `receive`. Application ids containing `.` are
/// rejected as `ConfigInvalid` per the shared folder layout.
pub async fn scan_applications(
    applications_dir: &Path,
) -> Result<HashMap<ApplicationId, AdapterBundle>, CapabilityError> {
    let mut bundles = HashMap::new();

    let mut entries = tokio::fs::read_dir(applications_dir)
        .await
        .map_err(|source| CapabilityError::Io {
            path: applications_dir.to_path_buf(),
            source,
        })?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| CapabilityError::Io { path: applications_dir.to_path_buf(), source })?
    {
        if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !ApplicationId::is_valid(&name) {
            return Err(CapabilityError::InvalidApplicationId(name));
        }

        let dir = entry.path();
        let send = dir.join("send");
        let process = dir.join("process");
        let receive = dir.join("receive");
        if send.exists() && process.exists() && receive.exists() {
            bundles.insert(ApplicationId::from(name.as_str()), AdapterBundle { send, process, receive });
        }
    }

    Ok(bundles)
}
