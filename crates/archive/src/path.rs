//! Path policy: stable and collision-free by construction, since case ids
//! are unique (§4.1).

use std::path::{Path, PathBuf};

use gc_core::{CaseId, MachineId, UserId};

/// A canonical location within the Case Archive. Relative to the configured
/// archive root; never escapes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivePath(PathBuf);

impl ArchivePath {
    /// `cases/<user>/<machine>/<id>.zip`
    pub fn input(user: &UserId, machine: &MachineId, id: &CaseId) -> Self {
        Self(
            Path::new("cases")
                .join(user.as_str())
                .join(machine.as_str())
                .join(format!("{id}.zip")),
        )
    }

    /// `results/<user>/<machine>/<id>.zip`
    pub fn result(user: &UserId, machine: &MachineId, id: &CaseId) -> Self {
        Self(
            Path::new("results")
                .join(user.as_str())
                .join(machine.as_str())
                .join(format!("{id}.zip")),
        )
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The record's `path` field, as a canonical string the registry can
    /// store and log.
    pub fn to_canonical_string(&self) -> String {
        self.0.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}
