//! Poll engine - drives a job from creation to a terminal state
//!
//! One blocking loop per job handle. The deadline is checked strictly
//! before each status request, so the engine never starts a request it
//! cannot act on within budget. Transient read failures are retried in
//! place, capped at three consecutive failures.

use crate::backend::{GenerationBackend, GenerationResult, JobHandle, JobState};
use crate::progress::{ProgressEvent, ProgressSink};
use prism_core::{PrismError, Result};
use std::time::{Duration, Instant};

/// Fixed pause between transient-failure retries
const TRANSIENT_BACKOFF: Duration = Duration::from_secs(2);
/// Consecutive transient failures tolerated before escalating
const MAX_TRANSIENT_FAILURES: u32 = 3;

/// Blocking poll loop with a hard wall-clock budget.
///
/// Bounds (interval 1-10s, timeout 60-600s) are validated by the CLI
/// layer; the engine trusts them.
pub struct PollEngine {
    poll_interval: Duration,
    timeout: Duration,
    backoff: Duration,
}

impl PollEngine {
    pub fn new(poll_interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
            timeout: Duration::from_secs(timeout_secs),
            backoff: TRANSIENT_BACKOFF,
        }
    }

    /// Poll `handle` until it reaches a terminal state.
    ///
    /// Returns the embedded result on `succeeded`, the server-supplied
    /// error on `failed`, `Timeout` once the budget is exhausted, or the
    /// triggering error after three consecutive transient read failures.
    pub fn wait(
        &self,
        backend: &dyn GenerationBackend,
        handle: &JobHandle,
        progress: &dyn ProgressSink,
    ) -> Result<GenerationResult> {
        let start = Instant::now();
        let mut transient_failures = 0u32;

        loop {
            // The deadline is evaluated only at the top of a full polling
            // cycle, never during the short transient-retry backoff, so
            // worst-case overrun is bounded by the retry backoffs plus one
            // in-flight request timeout.
            if start.elapsed() > self.timeout {
                return Err(PrismError::Timeout(self.timeout.as_secs()));
            }

            let state = loop {
                match backend.fetch_status(handle) {
                    Ok(state) => {
                        transient_failures = 0;
                        break state;
                    }
                    Err(e) if e.is_transient() => {
                        transient_failures += 1;
                        if transient_failures >= MAX_TRANSIENT_FAILURES {
                            return Err(e);
                        }
                        progress.on_event(ProgressEvent::TransientFailure {
                            elapsed_secs: start.elapsed().as_secs(),
                            message: e.to_string(),
                        });
                        std::thread::sleep(self.backoff);
                    }
                    Err(e) => return Err(e),
                }
            };

            match state {
                JobState::Queued => {
                    progress.on_event(ProgressEvent::JobStatus {
                        elapsed_secs: start.elapsed().as_secs(),
                        status: "queued",
                    });
                    std::thread::sleep(self.poll_interval);
                }
                JobState::Running => {
                    progress.on_event(ProgressEvent::JobStatus {
                        elapsed_secs: start.elapsed().as_secs(),
                        status: "running",
                    });
                    std::thread::sleep(self.poll_interval);
                }
                JobState::Succeeded(result) => return Ok(result),
                JobState::Failed(msg) => {
                    return Err(PrismError::ServerError(format!(
                        "generation failed: {}",
                        msg
                    )));
                }
            }
        }
    }
}
