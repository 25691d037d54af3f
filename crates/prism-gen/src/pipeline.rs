//! End-to-end pipeline: submit, poll to a terminal state, download
//!
//! Each stage fails closed; an error at any stage aborts the whole
//! operation with no partial retries across stage boundaries.

use crate::backend::{GenerationBackend, GenerationResult, JobHandle};
use crate::download;
use crate::poll::PollEngine;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::request::GenerationRequest;
use prism_core::Result;
use std::path::{Path, PathBuf};

/// Everything a caller needs after a successful run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub handle: JobHandle,
    pub result: GenerationResult,
    /// Files actually written, in artifact order
    pub written: Vec<PathBuf>,
}

/// Run one request end to end against the given backend
pub fn run(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
    output: &Path,
    engine: &PollEngine,
    progress: &dyn ProgressSink,
) -> Result<PipelineOutcome> {
    let handle = backend.submit(request)?;
    progress.on_event(ProgressEvent::JobSubmitted {
        handle: handle.id().to_string(),
    });

    let result = engine.wait(backend, &handle, progress)?;
    let written = download::download_all(backend, &result, output, progress)?;

    Ok(PipelineOutcome {
        handle,
        result,
        written,
    })
}
