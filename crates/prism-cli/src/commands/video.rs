//! `prism video` - text/image to video generation

use super::{validate_polling_bounds, StderrSink};
use anyhow::Result;
use clap::Args;
use prism_gen::{
    pipeline, ArkBackend, GenerationOptions, GenerationRequest, MediaReference, PollEngine,
    PrismConfig, VideoOptions,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct VideoArgs {
    /// Prompt describing the video
    #[arg(long)]
    pub prompt: String,

    /// Reference image: URL, data URL, local path or file:// path
    /// (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,

    /// Model ID (default from config)
    #[arg(long)]
    pub model: Option<String>,

    /// Clip length in seconds
    #[arg(long)]
    pub duration: Option<u32>,

    /// Aspect ratio
    #[arg(long, value_parser = ["adaptive", "16:9", "9:16", "1:1"])]
    pub ratio: Option<String>,

    /// Generate a synchronized audio track
    #[arg(long)]
    pub audio: bool,

    /// Skip the watermark
    #[arg(long)]
    pub no_watermark: bool,

    /// Output file path
    #[arg(long, default_value = "generated_video.mp4")]
    pub output: PathBuf,

    /// Seconds between status polls (1-10)
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Overall wait budget in seconds (60-600)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Seedance pro models accept 4-12s clips, the rest 2-12s
fn validate_duration(duration: u32, model: &str) -> Result<()> {
    let range = if model.contains("1-5-pro") {
        4..=12
    } else {
        2..=12
    };
    if !range.contains(&duration) {
        anyhow::bail!(
            "duration for model {} must be between {} and {} seconds",
            model,
            range.start(),
            range.end()
        );
    }
    Ok(())
}

pub fn run(args: VideoArgs) -> Result<()> {
    let config = PrismConfig::load()?;

    let model = args
        .model
        .unwrap_or_else(|| config.generation.video_model.clone());
    let duration = args.duration.unwrap_or(config.generation.duration_secs);
    let ratio = args.ratio.unwrap_or_else(|| config.generation.ratio.clone());
    let poll_interval = args
        .poll_interval
        .unwrap_or(config.generation.poll_interval_secs);
    let timeout = args.timeout.unwrap_or(config.generation.timeout_secs);

    validate_duration(duration, &model)?;
    validate_polling_bounds(poll_interval, timeout)?;

    let request = GenerationRequest {
        model,
        prompt: args.prompt,
        inputs: args.images.iter().map(|s| MediaReference::parse(s)).collect(),
        watermark: !args.no_watermark,
        options: GenerationOptions::Video(VideoOptions {
            duration_secs: duration,
            ratio,
            generate_audio: args.audio,
        }),
    };

    let backend = ArkBackend::from_config(&config)?;
    let engine = PollEngine::new(poll_interval, timeout);
    let outcome = pipeline::run(&backend, &request, &args.output, &engine, &StderrSink)?;

    // Success summary on stdout
    println!("Video generated successfully");
    println!("Job ID: {}", outcome.handle.id());
    for path in &outcome.written {
        println!("File: {}", path.display());
    }
    if let Some(resolution) = &outcome.result.resolution {
        println!("Resolution: {resolution}");
    }
    if let Some(ratio) = &outcome.result.ratio {
        println!("Ratio: {ratio}");
    }
    if let Some(duration) = outcome.result.duration_secs {
        println!("Duration: {duration}s");
    }
    if let Some(fps) = outcome.result.frames_per_second {
        println!("Frame rate: {fps} fps");
    }
    if outcome.result.has_audio {
        println!("Audio: included");
    }

    Ok(())
}
