//! Prism Gen - asynchronous generative-media job lifecycle client
//!
//! Submits a video or image generation job to the remote Ark service,
//! polls it to a terminal state under a hard wall-clock timeout, and
//! streams the resulting artifact(s) to local storage. The backend is a
//! trait so the whole lifecycle can be exercised against scripted fakes.

pub mod ark;
pub mod backend;
pub mod config;
pub mod download;
pub mod media;
pub mod pipeline;
pub mod poll;
pub mod progress;
pub mod request;

pub use ark::ArkBackend;
pub use backend::{Artifact, ArtifactStream, GenerationBackend, GenerationResult, JobHandle, JobState};
pub use config::PrismConfig;
pub use media::MediaReference;
pub use pipeline::PipelineOutcome;
pub use poll::PollEngine;
pub use progress::{NullSink, ProgressEvent, ProgressSink};
pub use request::{GenerationOptions, GenerationRequest, ImageOptions, MediaKind, VideoOptions};
