//! Runs an adapter's `send`/`process`/`receive` executable as a child
//! process: process isolation, cancellation by killing the child, a small
//! stdin/stdout JSON protocol describing input paths and collecting output
//! paths. Per the design notes: treat adapters as external executables, do
//! not embed a scripting runtime.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use gc_capability::{AdapterError, ApplicationAdapter, InputBundleSpec};
use gc_core::ApplicationId;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

use crate::error::SubprocessError;
use crate::protocol::{ProcessRequest, ProcessResponse, ReceiveRequest, SendRequest, SendResponse};

pub struct SubprocessAdapter {
    application: ApplicationId,
    send: PathBuf,
    process: PathBuf,
    receive: PathBuf,
}

impl SubprocessAdapter {
    pub fn new(application: ApplicationId, send: PathBuf, process: PathBuf, receive: PathBuf) -> Self {
        Self { application, send, process, receive }
    }

    pub fn from_bundle(application: ApplicationId, bundle: &gc_capability::AdapterBundle) -> Self {
        Self::new(
            application,
            bundle.send.clone(),
            bundle.process.clone(),
            bundle.receive.clone(),
        )
    }

    async fn run<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        program: &Path,
        request: &Req,
    ) -> Result<Resp, SubprocessError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Cancellation drops the `process()` future rather than
            // awaiting it to completion (see `WorkerPool::run_job`); without
            // this the child would keep running as an orphan.
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SubprocessError::Spawn { program: program.to_path_buf(), source })?;

        let payload = serde_json::to_vec(request)
            .map_err(|source| SubprocessError::Protocol { program: program.to_path_buf(), source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|source| SubprocessError::Io { program: program.to_path_buf(), source })?;
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| SubprocessError::Io { program: program.to_path_buf(), source })?;

        if !output.status.success() {
            return Err(SubprocessError::NonZeroExit {
                program: program.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|source| SubprocessError::Protocol { program: program.to_path_buf(), source })
    }

    /// Like [`Self::run`], but the executable is not expected to print a
    /// response body — only its exit status matters.
    async fn run_no_response<Req: serde::Serialize>(
        &self,
        program: &Path,
        request: &Req,
    ) -> Result<(), SubprocessError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Cancellation drops the `process()` future rather than
            // awaiting it to completion (see `WorkerPool::run_job`); without
            // this the child would keep running as an orphan.
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SubprocessError::Spawn { program: program.to_path_buf(), source })?;

        let payload = serde_json::to_vec(request)
            .map_err(|source| SubprocessError::Protocol { program: program.to_path_buf(), source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|source| SubprocessError::Io { program: program.to_path_buf(), source })?;
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| SubprocessError::Io { program: program.to_path_buf(), source })?;

        if !output.status.success() {
            return Err(SubprocessError::NonZeroExit {
                program: program.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ApplicationAdapter for SubprocessAdapter {
    #[instrument(skip(self), fields(application = %self.application))]
    async fn send(&self, user_selection: &str) -> Result<Vec<InputBundleSpec>, AdapterError> {
        let request = SendRequest { user_selection: user_selection.to_string() };
        let response: SendResponse = self.run(&self.send, &request).await?;
        Ok(response
            .bundles
            .into_iter()
            .map(|files| InputBundleSpec { files })
            .collect())
    }

    #[instrument(skip(self, input_files), fields(application = %self.application))]
    async fn process(
        &self,
        scratch_dir: &Path,
        input_files: &[PathBuf],
    ) -> Result<Vec<PathBuf>, AdapterError> {
        let request = ProcessRequest {
            scratch_dir: scratch_dir.to_path_buf(),
            input_files: input_files.to_vec(),
        };
        let response: ProcessResponse = self.run(&self.process, &request).await?;
        Ok(response.output_files)
    }

    #[instrument(skip(self, output_files), fields(application = %self.application))]
    async fn receive(&self, scratch_dir: &Path, output_files: &[PathBuf]) -> Result<(), AdapterError> {
        let request = ReceiveRequest {
            scratch_dir: scratch_dir.to_path_buf(),
            output_files: output_files.to_vec(),
        };
        self.run_no_response(&self.receive, &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn executable_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, body).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    /// `gc-workerpool::pool::run_job` cancels a job by dropping the
    /// `process()` future, not by any explicit kill call. This only
    /// terminates the real child because of `kill_on_drop(true)` on the
    /// `Command` in `run` — without it this test fails with the child
    /// still alive after the future is dropped.
    #[cfg(unix)]
    #[tokio::test]
    async fn dropping_the_process_future_kills_the_child() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pid_file = dir.path().join("child.pid");
        let script = executable_script(
            dir.path(),
            "process.sh",
            &format!("#!/bin/sh\necho $$ > {}\nsleep 30\n", pid_file.display()),
        );

        let adapter = SubprocessAdapter::new(
            ApplicationId::from("test"),
            script.clone(),
            script.clone(),
            script,
        );

        let scratch = tempfile::tempdir().expect("tempdir");
        let scratch_path = scratch.path().to_path_buf();
        let task = tokio::spawn(async move { adapter.process(&scratch_path, &[]).await });

        let pid: i64 = loop {
            if let Ok(contents) = std::fs::read_to_string(&pid_file) {
                if let Ok(pid) = contents.trim().parse() {
                    break pid;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        };

        // Simulates `WorkerPool::cancel`: the enclosing future is dropped
        // without ever being polled to completion.
        task.abort();
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;

        let still_alive = std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .status()
            .expect("run kill -0")
            .success();
        assert!(!still_alive, "child process {pid} should have been killed when its future dropped");
    }
}
