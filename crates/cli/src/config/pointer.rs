//! Resolves the pointer file: a single path string naming the shared-folder
//! root, whitespace trimmed. Location follows the same override-chain idiom
//! as the teacher's state-dir resolution: an explicit override, then a path
//! next to the running executable.

use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const POINTER_FILE_ENV: &str = "GRIDCOMPUTE_POINTER_FILE";
const DEFAULT_POINTER_FILE_NAME: &str = ".gridcompute-pointer";

/// `GRIDCOMPUTE_POINTER_FILE` > `<executable dir>/.gridcompute-pointer`.
pub fn pointer_file_path() -> Result<PathBuf, CliError> {
    if let Ok(path) = std::env::var(POINTER_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        CliError::Config("could not determine executable directory for pointer file lookup".into())
    })?;
    Ok(dir.join(DEFAULT_POINTER_FILE_NAME))
}

/// Reads and trims the pointer file at `path`, returning the shared-folder
/// root it names.
pub async fn resolve_shared_root(path: &Path) -> Result<PathBuf, CliError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| {
        CliError::Config(format!("reading pointer file {}: {source}", path.display()))
    })?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CliError::Config(format!("pointer file {} is empty", path.display())));
    }
    Ok(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trims_whitespace_around_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pointer = dir.path().join("pointer");
        tokio::fs::write(&pointer, b"  /srv/gridcompute/shared  \n").await.expect("write");

        let root = resolve_shared_root(&pointer).await.expect("resolve");
        assert_eq!(root, PathBuf::from("/srv/gridcompute/shared"));
    }

    #[tokio::test]
    async fn empty_pointer_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pointer = dir.path().join("pointer");
        tokio::fs::write(&pointer, b"   \n").await.expect("write");

        let err = resolve_shared_root(&pointer).await.unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
