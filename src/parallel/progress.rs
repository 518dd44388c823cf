//! Progress tracking for parallel operations

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crossbeam::channel::{self, Receiver, Sender};
use serde::Serialize;
use tracing::debug;

use crate::error::ResizeError;
use crate::processing::FileOutcome;

/// Which stage a recorded failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Source unreadable or corrupt; no variant was attempted
    Decode,
    /// One variant could not be produced
    Encode,
}

/// Diagnostic kept for every failure of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub file: PathBuf,
    pub suffix: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

impl FailureRecord {
    /// A source abandoned before any of its variants was attempted
    pub fn skipped(file: &Path, error: &ResizeError) -> Self {
        let message = match error {
            ResizeError::DecodeFailure { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            file: file.to_path_buf(),
            suffix: None,
            kind: FailureKind::Decode,
            message,
        }
    }

    /// One failed variant of a processed source
    pub fn variant(file: &Path, error: &ResizeError) -> Self {
        let (suffix, message) = match error {
            ResizeError::EncodeFailure { suffix, message, .. } => (Some(suffix.clone()), message.clone()),
            other => (None, other.to_string()),
        };

        Self {
            file: file.to_path_buf(),
            suffix,
            kind: FailureKind::Encode,
            message,
        }
    }
}

/// Progress update event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    Started {
        total_files: usize,
        workers: usize,
    },
    FileCompleted {
        file: PathBuf,
        worker: usize,
        variants_written: usize,
        variants_failed: usize,
    },
    FileFailed {
        file: PathBuf,
        worker: usize,
        error: String,
    },
    Finished {
        processed_files: usize,
        failed_files: usize,
    },
}

/// Thread-safe counters and diagnostics shared by every worker of a run
#[derive(Debug, Default)]
pub struct ProgressTracker {
    processed: AtomicUsize,
    failed: AtomicUsize,
    variants_written: AtomicUsize,
    failures: Mutex<Vec<FailureRecord>>,
    subscribers: Mutex<Vec<Sender<ProgressUpdate>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every update published from now until [`finish`](Self::finish)
    pub fn subscribe(&self) -> Receiver<ProgressUpdate> {
        let (sender, receiver) = channel::unbounded();
        lock(&self.subscribers).push(sender);
        receiver
    }

    pub fn start(&self, total_files: usize, workers: usize) {
        self.publish(ProgressUpdate::Started {
            total_files,
            workers,
        });
    }

    /// Count a file whose specs were all attempted, keeping its encode failures
    pub fn record_outcome(&self, worker: usize, outcome: &FileOutcome) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.variants_written
            .fetch_add(outcome.written.len(), Ordering::SeqCst);

        if !outcome.failures.is_empty() {
            lock(&self.failures).extend(
                outcome
                    .failures
                    .iter()
                    .map(|e| FailureRecord::variant(&outcome.source, e)),
            );
        }

        self.publish(ProgressUpdate::FileCompleted {
            file: outcome.source.clone(),
            worker,
            variants_written: outcome.written.len(),
            variants_failed: outcome.failures.len(),
        });
    }

    /// Record a file that was skipped; it does not count as processed
    pub fn record_failure(&self, worker: usize, source: &Path, error: &ResizeError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        let record = FailureRecord::skipped(source, error);

        self.publish(ProgressUpdate::FileFailed {
            file: record.file.clone(),
            worker,
            error: record.message.clone(),
        });
        lock(&self.failures).push(record);
    }

    /// Publish the final update and close every subscriber channel
    pub fn finish(&self) {
        self.publish(ProgressUpdate::Finished {
            processed_files: self.processed_files(),
            failed_files: self.failed_files(),
        });

        let closed = std::mem::take(&mut *lock(&self.subscribers));
        debug!("Closed {} progress subscriber(s)", closed.len());
    }

    pub fn processed_files(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn failed_files(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn variants_written(&self) -> usize {
        self.variants_written.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        lock(&self.failures).clone()
    }

    fn publish(&self, update: ProgressUpdate) {
        // dropped receivers are simply skipped
        for sender in lock(&self.subscribers).iter() {
            let _ = sender.send(update.clone());
        }
    }
}

/// Lock, recovering the data if a worker panicked while holding it
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
