//! Zipping and unzipping case bundles. The Case Archive stores raw bytes
//! and knows nothing about the zip format — that translation is the
//! scheduler's job, on both the submission side (zip before upload) and
//! the claim/completion side (unzip before materializing into a scratch
//! directory, zip before uploading a result).

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

use crate::error::SchedulerError;

/// Zip a set of local files (by their current paths) into an in-memory
/// archive, preserving only their file names.
pub fn zip_files(files: &[PathBuf]) -> Result<Vec<u8>, SchedulerError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for path in files {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| SchedulerError::Internal(format!("{path:?} has no utf-8 file name")))?;
            let mut bytes = Vec::new();
            std::fs::File::open(path)
                .map_err(|e| SchedulerError::Internal(format!("opening {path:?}: {e}")))?
                .read_to_end(&mut bytes)
                .map_err(|e| SchedulerError::Internal(format!("reading {path:?}: {e}")))?;
            writer
                .start_file(name, options)
                .map_err(|e| SchedulerError::Internal(format!("zip entry {name}: {e}")))?;
            writer
                .write_all(&bytes)
                .map_err(|e| SchedulerError::Internal(format!("zip entry {name}: {e}")))?;
        }
        writer
            .finish()
            .map_err(|e| SchedulerError::Internal(format!("finishing zip: {e}")))?;
    }
    Ok(buffer.into_inner())
}

/// Unzip an in-memory archive into `dest_dir`, returning the materialized
/// file paths in archive order. An empty archive is a valid, empty result
/// (B2: zero outputs still completes the case).
pub fn unzip_bytes(bytes: &[u8], dest_dir: &Path) -> Result<Vec<PathBuf>, SchedulerError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| SchedulerError::Internal(format!("opening zip: {e}")))?;

    let mut files = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| SchedulerError::Internal(format!("zip entry {i}: {e}")))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let dest = dest_dir.join(&name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SchedulerError::Internal(format!("creating {parent:?}: {e}")))?;
        }
        let mut out = std::fs::File::create(&dest)
            .map_err(|e| SchedulerError::Internal(format!("creating {dest:?}: {e}")))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| SchedulerError::Internal(format!("writing {dest:?}: {e}")))?;
        files.push(dest);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_then_unzip_round_trips_bytes() {
        let src_dir = tempfile::tempdir().expect("tempdir");
        let dest_dir = tempfile::tempdir().expect("tempdir");
        let file = src_dir.path().join("payload.bin");
        std::fs::write(&file, b"zip-round-trip").expect("write");

        let bytes = zip_files(&[file]).expect("zip");
        let outputs = unzip_bytes(&bytes, dest_dir.path()).expect("unzip");

        assert_eq!(outputs.len(), 1);
        assert_eq!(std::fs::read(&outputs[0]).expect("read"), b"zip-round-trip");
    }

    #[test]
    fn empty_input_produces_empty_but_present_archive_b2() {
        let dest_dir = tempfile::tempdir().expect("tempdir");
        let bytes = zip_files(&[]).expect("zip");
        assert!(!bytes.is_empty(), "a valid empty zip still has central-directory bytes");
        let outputs = unzip_bytes(&bytes, dest_dir.path()).expect("unzip");
        assert!(outputs.is_empty());
    }
}
