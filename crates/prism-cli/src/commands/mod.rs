//! CLI subcommands and shared plumbing

pub mod image;
pub mod video;

use anyhow::Result;
use prism_gen::{ProgressEvent, ProgressSink};

/// Poll interval bounds in seconds
const POLL_INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 1..=10;
/// Overall job timeout bounds in seconds
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 60..=600;

/// Bounds are enforced here, once; the lifecycle client trusts them.
pub fn validate_polling_bounds(poll_interval: u64, timeout: u64) -> Result<()> {
    if !POLL_INTERVAL_RANGE.contains(&poll_interval) {
        anyhow::bail!(
            "poll-interval must be between {} and {} seconds",
            POLL_INTERVAL_RANGE.start(),
            POLL_INTERVAL_RANGE.end()
        );
    }
    if !TIMEOUT_RANGE.contains(&timeout) {
        anyhow::bail!(
            "timeout must be between {} and {} seconds",
            TIMEOUT_RANGE.start(),
            TIMEOUT_RANGE.end()
        );
    }
    Ok(())
}

/// Progress sink printing to stderr so stdout stays machine-readable
pub struct StderrSink;

impl ProgressSink for StderrSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::JobSubmitted { handle } => {
                eprintln!("Job submitted: {handle}");
                eprintln!("Waiting for generation to complete (typically 30-120s)...");
            }
            ProgressEvent::JobStatus {
                elapsed_secs,
                status,
            } => {
                eprintln!("[{elapsed_secs}s] status: {status}...");
            }
            ProgressEvent::TransientFailure {
                elapsed_secs,
                message,
            } => {
                eprintln!("[{elapsed_secs}s] {message}, retrying...");
            }
            ProgressEvent::DownloadStarted { index, total } => {
                if total > 1 {
                    eprintln!("Downloading artifact {index}/{total}...");
                } else {
                    eprintln!("Downloading...");
                }
            }
            ProgressEvent::DownloadProgress {
                percent,
                downloaded_bytes,
                total_bytes,
            } => {
                eprint!(
                    "\r  {percent}% ({:.1}/{:.1} MB)",
                    mb(downloaded_bytes),
                    mb(total_bytes)
                );
            }
            ProgressEvent::DownloadFinished { path } => {
                eprintln!();
                eprintln!("Saved: {}", path.display());
            }
            ProgressEvent::ArtifactSkipped { index, reason } => {
                eprintln!("Artifact {index} skipped: {reason}");
            }
        }
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
