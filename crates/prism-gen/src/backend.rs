//! Generation backend trait and job lifecycle types
//!
//! The trait is the seam between the lifecycle logic (poll engine,
//! downloader, pipeline) and the actual HTTP service, so tests drive the
//! lifecycle against scripted fakes.

use crate::request::GenerationRequest;
use prism_core::Result;
use std::io::Read;

/// Opaque identifier returned by the remote service at creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Remote job status as observed by one status read.
///
/// Monotonic per handle: once `Succeeded` or `Failed` is observed, no
/// further reads are issued for that handle.
#[derive(Debug, Clone)]
pub enum JobState {
    Queued,
    Running,
    Succeeded(GenerationResult),
    Failed(String),
}

/// A single downloadable artifact within a result
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Download URL; may be absent for individual entries of a group
    pub url: Option<String>,
    /// Size label reported by the service (e.g. "2048x2048")
    pub size: Option<String>,
}

/// Artifact URLs plus metadata from a succeeded job
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// One or more artifacts, in the order the service returned them
    pub artifacts: Vec<Artifact>,
    pub resolution: Option<String>,
    pub ratio: Option<String>,
    pub duration_secs: Option<u64>,
    pub frames_per_second: Option<u64>,
    pub has_audio: bool,
    pub generated_images: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// A streaming artifact body with an optional total-size hint
pub struct ArtifactStream {
    pub reader: Box<dyn Read>,
    /// From the `content-length` header when present; absence suppresses
    /// percentage progress reporting but is not an error
    pub total_bytes: Option<u64>,
}

/// One remote generation service, seen through the three lifecycle calls
pub trait GenerationBackend {
    /// Create a job. Never retried: a failed creation has no side effect
    /// to reconcile, and a silent retry risks duplicate billable jobs.
    fn submit(&self, request: &GenerationRequest) -> Result<JobHandle>;

    /// Read the current job state. Uses a short per-call timeout,
    /// independent of the overall job budget.
    fn fetch_status(&self, handle: &JobHandle) -> Result<JobState>;

    /// Open a streaming read of one artifact URL.
    fn fetch_artifact(&self, url: &str) -> Result<ArtifactStream>;
}
