//! Progress events emitted by the lifecycle client
//!
//! The library never prints; callers install a sink (the CLI writes to
//! stderr, tests record events).

use std::path::PathBuf;

/// One observable step of the submit/poll/download pipeline
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The remote service accepted the job
    JobSubmitted { handle: String },
    /// One successful status read that was not yet terminal
    JobStatus {
        elapsed_secs: u64,
        status: &'static str,
    },
    /// A retryable status-read failure; the engine is backing off
    TransientFailure {
        elapsed_secs: u64,
        message: String,
    },
    /// Starting the download of artifact `index` of `total` (1-based)
    DownloadStarted { index: usize, total: usize },
    /// Emitted per chunk, only when a total-size hint is available
    DownloadProgress {
        percent: u8,
        downloaded_bytes: u64,
        total_bytes: u64,
    },
    /// One artifact fully written
    DownloadFinished { path: PathBuf },
    /// An artifact of a group had no URL or failed; the batch continues
    ArtifactSkipped { index: usize, reason: String },
}

/// Receiver for pipeline progress events
pub trait ProgressSink {
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that discards all events
#[derive(Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
