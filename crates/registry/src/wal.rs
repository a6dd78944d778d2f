//! A minimal append-only JSONL event log, flock-guarded so that more than
//! one `EmbeddedRegistry` process rooted at the same directory (the normal
//! deployment: one `gridctl agent run` per machine, all pointed at the
//! shared Registry folder) never interleaves writes.
//!
//! Every CAS-relevant operation goes through [`Wal::cas`]: while holding an
//! OS-level exclusive lock on the log file, it first re-reads any lines
//! appended by other processes since this handle last saw the log, applies
//! them to the in-memory state, *then* evaluates the caller's precondition
//! against that now-current state, and only then appends. The in-process
//! `tokio::sync::Mutex` in `embedded.rs` still serializes concurrent callers
//! within one process; the file lock here is what makes the CAS safe across
//! processes too.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::RegistryError;
use crate::event::{RegistryEvent, RegistryEventKind};
use crate::state::{self, RegistryState};

pub struct Wal {
    path: PathBuf,
    next_seq: u64,
}

impl Wal {
    /// Open (creating if absent) the log at `path`, returning the events
    /// with `seq > processed_seq` for replay.
    pub async fn open(path: &Path, processed_seq: u64) -> Result<(Self, Vec<RegistryEvent>), RegistryError> {
        let path = path.to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let blocking_path = path.clone();
        let (max_seq, to_replay) = tokio::task::spawn_blocking(move || {
            OpenOptions::new().create(true).append(true).open(&blocking_path)?;
            let lock_file = File::open(&blocking_path)?;
            lock_file.lock_shared()?;
            let result = read_events_after(&blocking_path, processed_seq);
            let _ = FileExt::unlock(&lock_file);
            result
        })
        .await??;

        Ok((Self { path, next_seq: max_seq.max(processed_seq) + 1 }, to_replay))
    }

    /// Refreshes `state` with every event appended — by this handle or by
    /// another process sharing this directory — since the last time this
    /// handle looked, then calls `decide` against that now-current state.
    /// If `decide` returns `Some(event)`, the event is appended and applied
    /// before the lock is released. Returns whether an event was appended.
    pub async fn cas(
        &mut self,
        state: &mut RegistryState,
        decide: impl FnOnce(&RegistryState) -> Option<RegistryEventKind> + Send + 'static,
    ) -> Result<bool, RegistryError> {
        let path = self.path.clone();
        let after_seq = self.next_seq.saturating_sub(1);
        let mut taken = std::mem::take(state);

        let (next_seq, taken, applied) = tokio::task::spawn_blocking(move || -> Result<_, RegistryError> {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.lock_exclusive()?;

            let result = (|| -> Result<_, RegistryError> {
                let (max_seq, catch_up) = read_events_after(&path, after_seq)?;
                for event in &catch_up {
                    state::apply(&mut taken, &event.kind);
                }
                let mut seq = max_seq.max(after_seq) + 1;

                let applied = match decide(&taken) {
                    Some(kind) => {
                        let event = RegistryEvent { seq, kind };
                        let mut line = serde_json::to_vec(&event)?;
                        line.push(b'\n');
                        (&file).write_all(&line)?;
                        (&file).flush()?;
                        state::apply(&mut taken, &event.kind);
                        seq += 1;
                        true
                    }
                    None => false,
                };

                Ok((seq, taken, applied))
            })();

            let _ = FileExt::unlock(&file);
            result
        })
        .await??;

        *state = taken;
        self.next_seq = next_seq;
        Ok(applied)
    }

    pub fn last_seq(&self) -> u64 {
        self.next_seq.saturating_sub(1)
    }

    /// Replace the log with an empty file, typically called right after a
    /// snapshot has captured everything up to `last_seq`.
    pub async fn truncate(path: &Path) -> Result<(), RegistryError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), RegistryError> {
            let file = OpenOptions::new().write(true).create(true).open(&path)?;
            file.lock_exclusive()?;
            let result = file.set_len(0);
            let _ = FileExt::unlock(&file);
            result?;
            Ok(())
        })
        .await??;
        Ok(())
    }
}

/// Blocking: reads every complete line in `path`, returning the highest
/// `seq` seen and the events with `seq > after_seq`. Called only while the
/// caller already holds (at least) a shared lock on `path`.
fn read_events_after(path: &Path, after_seq: u64) -> Result<(u64, Vec<RegistryEvent>), RegistryError> {
    let mut max_seq = after_seq;
    let mut events = Vec::new();

    if path.exists() {
        let file = File::open(path)?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: RegistryEvent = serde_json::from_str(&line)?;
            max_seq = max_seq.max(event.seq);
            if event.seq > after_seq {
                events.push(event);
            }
        }
    }

    Ok((max_seq, events))
}

pub fn default_path(dir: &Path) -> PathBuf {
    dir.join("events.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::CaseId;

    #[tokio::test]
    async fn replay_skips_already_processed_events() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = default_path(dir.path());

        let (mut wal, replay) = Wal::open(&path, 0).await.expect("open");
        assert!(replay.is_empty());
        let mut state = RegistryState::new();
        wal.cas(&mut state, |_| Some(RegistryEventKind::CaseDeleted { id: CaseId::new() }))
            .await
            .expect("append 1");
        wal.cas(&mut state, |_| Some(RegistryEventKind::CaseDeleted { id: CaseId::new() }))
            .await
            .expect("append 2");
        drop(wal);

        let (_wal, replay) = Wal::open(&path, 1).await.expect("reopen");
        assert_eq!(replay.len(), 1);
        assert_eq!(replay[0].seq, 2);
    }

    #[tokio::test]
    async fn truncate_then_reopen_starts_fresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = default_path(dir.path());

        let (mut wal, _) = Wal::open(&path, 0).await.expect("open");
        let mut state = RegistryState::new();
        wal.cas(&mut state, |_| Some(RegistryEventKind::CaseDeleted { id: CaseId::new() }))
            .await
            .expect("append");
        drop(wal);

        Wal::truncate(&path).await.expect("truncate");
        let (_wal, replay) = Wal::open(&path, 0).await.expect("reopen");
        assert!(replay.is_empty());
    }

    /// Two independent `Wal` handles over the same file — standing in for
    /// two separate `gridctl agent run` processes — never lose an append:
    /// each sees the other's write before deciding its own CAS.
    #[tokio::test]
    async fn two_handles_on_the_same_path_never_both_win_a_cas() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = default_path(dir.path());

        let (mut a, _) = Wal::open(&path, 0).await.expect("open a");
        let (mut b, _) = Wal::open(&path, 0).await.expect("open b");

        let mut state_a = RegistryState::new();
        let mut state_b = RegistryState::new();

        // Only the first writer to observe an empty log may "claim" it.
        let won_a = a
            .cas(&mut state_a, |state| if state.versions.is_empty() {
                Some(RegistryEventKind::VersionSet {
                    record: gc_core::VersionRecord {
                        id: "winner".into(),
                        status: gc_core::VersionStatus::Allowed,
                        message: None,
                    },
                })
            } else {
                None
            })
            .await
            .expect("a's cas");
        let won_b = b
            .cas(&mut state_b, |state| if state.versions.is_empty() {
                Some(RegistryEventKind::VersionSet {
                    record: gc_core::VersionRecord {
                        id: "winner".into(),
                        status: gc_core::VersionStatus::Allowed,
                        message: None,
                    },
                })
            } else {
                None
            })
            .await
            .expect("b's cas");

        assert_ne!(won_a, won_b, "exactly one of the two processes wins the CAS");
    }
}
