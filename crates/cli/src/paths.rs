//! Local, per-machine state: the worker pool's scratch root and the
//! result-retrieval duty's unpack root. Distinct from the shared folder
//! (§6) and from the Case Registry's own directory (`startup` roots that
//! under the shared folder instead, since it is the one piece of
//! cross-machine coordination state this filesystem-only build has).
//!
//! Resolution follows the teacher's `state_dir()` override chain:
//! `GRIDCOMPUTE_STATE_DIR` > `XDG_STATE_HOME/gridcompute` >
//! `~/.local/state/gridcompute`.

use std::path::PathBuf;

use crate::error::CliError;

pub const STATE_DIR_ENV: &str = "GRIDCOMPUTE_STATE_DIR";

pub fn state_dir() -> Result<PathBuf, CliError> {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("gridcompute"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| CliError::Config("no home directory: set GRIDCOMPUTE_STATE_DIR".into()))?;
    Ok(PathBuf::from(home).join(".local/state/gridcompute"))
}

pub fn scratch_root(state_dir: &std::path::Path, machine: &gc_core::MachineId) -> PathBuf {
    state_dir.join("scratch").join(machine.as_str())
}

pub fn retrieval_root(state_dir: &std::path::Path, machine: &gc_core::MachineId) -> PathBuf {
    state_dir.join("retrieve").join(machine.as_str())
}
