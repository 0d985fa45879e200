//! Pull-based result streams bridging the worker pool's output channel to
//! the caller (spec.md section 4.4).

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use crate::cancellation::CancellationToken;
use crate::entry::FileSystemEntry;

/// Bound on how long `Drop` waits for workers to quiesce after cancellation
/// (spec.md section 4.4, "waits a bounded time (e.g. 30s) for in-flight
/// workers to observe cancellation").
const QUIESCE_TIMEOUT: Duration = Duration::from_secs(30);

/// A single-pass, non-restartable stream of [`FileSystemEntry`] records
/// (spec.md section 4.4). Dropping it before exhaustion cancels the
/// underlying walk and drains the channel for up to [`QUIESCE_TIMEOUT`] so
/// worker threads don't outlive the caller's interest in their output.
pub struct EntryStream {
    receiver: Receiver<FileSystemEntry>,
    cancellation: CancellationToken,
    finished: bool,
}

impl EntryStream {
    pub(crate) fn new(receiver: Receiver<FileSystemEntry>, cancellation: CancellationToken) -> Self {
        Self { receiver, cancellation, finished: false }
    }

    /// Requests cancellation without waiting for it to take effect. Workers
    /// observe this at the two checkpoints spec.md section 4.3 defines.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}

impl Iterator for EntryStream {
    type Item = FileSystemEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.receiver.recv() {
            Ok(entry) => Some(entry),
            Err(_) => {
                self.finished = true;
                None
            }
        }
    }
}

impl Drop for EntryStream {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.cancellation.cancel();
        let deadline = Instant::now() + QUIESCE_TIMEOUT;
        while Instant::now() < deadline {
            if self.receiver.recv_timeout(Duration::from_millis(50)).is_err() {
                break;
            }
        }
    }
}

/// Like [`EntryStream`] but yields only paths, skipping security resolution
/// entirely (spec.md section 6, `enumerate_paths`).
pub struct PathStream {
    inner: EntryStream,
}

impl PathStream {
    pub(crate) fn new(inner: EntryStream) -> Self {
        Self { inner }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }
}

impl Iterator for PathStream {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| PathBuf::from(entry.path))
    }
}
