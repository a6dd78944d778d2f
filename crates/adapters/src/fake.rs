//! An in-process, closure-backed adapter for unit tests: the identity
//! adapter round-trip (R1) and the zero-output boundary (B2) without
//! spawning real processes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gc_capability::{AdapterError, ApplicationAdapter, InputBundleSpec};

type ProcessFn = Box<dyn Fn(&Path, &[PathBuf]) -> Result<Vec<PathBuf>, AdapterError> + Send + Sync>;

/// Copies every input file byte-for-byte into the scratch directory under
/// the same file name and reports them as outputs — the identity transform
/// used by the round-trip law (R1).
pub struct FakeAdapter {
    process: ProcessFn,
}

impl FakeAdapter {
    pub fn identity() -> Self {
        Self {
            process: Box::new(|scratch_dir, input_files| {
                let mut outputs = Vec::new();
                for input in input_files {
                    let name = input
                        .file_name()
                        .ok_or_else(|| AdapterError::Failed(format!("{input:?} has no file name")))?;
                    let dest = scratch_dir.join(name);
                    let bytes = std::fs::read(input)
                        .map_err(|e| AdapterError::Failed(format!("reading {input:?}: {e}")))?;
                    std::fs::write(&dest, bytes)
                        .map_err(|e| AdapterError::Failed(format!("writing {dest:?}: {e}")))?;
                    outputs.push(dest);
                }
                Ok(outputs)
            }),
        }
    }

    /// An adapter whose `process` always produces zero output files — used
    /// to exercise B2 (case still completes; result archive is
    /// empty-but-present).
    pub fn no_outputs() -> Self {
        Self {
            process: Box::new(|_scratch_dir, _input_files| Ok(Vec::new())),
        }
    }

    /// An adapter whose `process` always fails — used to exercise the
    /// `ADAPTER_FAILED` / reclamation path.
    pub fn always_fails(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            process: Box::new(move |_, _| Err(AdapterError::Failed(message.clone()))),
        }
    }
}

#[async_trait]
impl ApplicationAdapter for FakeAdapter {
    async fn send(&self, user_selection: &str) -> Result<Vec<InputBundleSpec>, AdapterError> {
        Ok(vec![InputBundleSpec {
            files: vec![PathBuf::from(user_selection)],
        }])
    }

    async fn process(
        &self,
        scratch_dir: &Path,
        input_files: &[PathBuf],
    ) -> Result<Vec<PathBuf>, AdapterError> {
        (self.process)(scratch_dir, input_files)
    }

    async fn receive(&self, _scratch_dir: &Path, _output_files: &[PathBuf]) -> Result<(), AdapterError> {
        Ok(())
    }
}
