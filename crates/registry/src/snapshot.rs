//! Periodic durable snapshot of the materialized state, so the event log
//! does not grow without bound. Written with the same write-tmp, fsync,
//! rename, fsync-dir ordering the archive uses for result bundles.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::RegistryError;
use crate::state::RegistryState;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub last_seq: u64,
    pub state: RegistryState,
}

pub fn default_path(dir: &Path) -> PathBuf {
    dir.join("snapshot.json")
}

pub async fn write(dir: &Path, snapshot: &Snapshot) -> Result<(), RegistryError> {
    tokio::fs::create_dir_all(dir).await?;
    let final_path = default_path(dir);
    let tmp_path = dir.join("snapshot.json.tmp");

    let bytes = serde_json::to_vec(snapshot)?;
    let mut tmp = tokio::fs::File::create(&tmp_path).await?;
    tmp.write_all(&bytes).await?;
    tmp.sync_all().await?;
    drop(tmp);

    tokio::fs::rename(&tmp_path, &final_path).await?;
    Ok(())
}

pub async fn load(dir: &Path) -> Result<Option<Snapshot>, RegistryError> {
    let path = default_path(dir);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load(dir.path()).await.expect("load").is_none());
    }

    #[tokio::test]
    async fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let snapshot = Snapshot {
            last_seq: 42,
            state: RegistryState::new(),
        };
        write(dir.path(), &snapshot).await.expect("write");
        let loaded = load(dir.path()).await.expect("load").expect("present");
        assert_eq!(loaded.last_seq, 42);
    }
}
