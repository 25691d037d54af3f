//! `prism image` - text/image to image generation

use super::{validate_polling_bounds, StderrSink};
use anyhow::Result;
use clap::Args;
use prism_gen::config::GenerationConfig;
use prism_gen::{
    pipeline, ArkBackend, GenerationOptions, GenerationRequest, ImageOptions, MediaReference,
    PollEngine, PrismConfig,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct ImageArgs {
    /// Prompt describing the image
    #[arg(long)]
    pub prompt: String,

    /// Reference image: URL, data URL, local path or file:// path
    /// (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,

    /// Model ID (default from config; `--search` picks the search model
    /// unless this is given)
    #[arg(long)]
    pub model: Option<String>,

    /// Output size class
    #[arg(long, value_parser = ["1K", "2K", "4K"])]
    pub size: Option<String>,

    /// Skip the watermark
    #[arg(long)]
    pub no_watermark: bool,

    /// Generate a themed group of images instead of a single one
    #[arg(long)]
    pub sequential: bool,

    /// Upper bound on group size when --sequential is set
    #[arg(long, default_value_t = 4)]
    pub max_images: u32,

    /// Let the model consult online search while generating
    #[arg(long)]
    pub search: bool,

    /// Output file path; group outputs get an _N suffix per artifact
    #[arg(long, default_value = "generated_image.png")]
    pub output: PathBuf,

    /// Seconds between status polls (1-10)
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Overall wait budget in seconds (60-600)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// An explicit --model always wins; otherwise --search routes to the
/// search-capable model.
fn resolve_model(model: Option<String>, search: bool, defaults: &GenerationConfig) -> String {
    match model {
        Some(model) => model,
        None if search => defaults.search_model.clone(),
        None => defaults.image_model.clone(),
    }
}

pub fn run(args: ImageArgs) -> Result<()> {
    let config = PrismConfig::load()?;

    let model = resolve_model(args.model, args.search, &config.generation);
    let size = args.size.unwrap_or_else(|| config.generation.size.clone());
    let poll_interval = args
        .poll_interval
        .unwrap_or(config.generation.poll_interval_secs);
    let timeout = args.timeout.unwrap_or(config.generation.timeout_secs);

    if args.max_images < 1 {
        anyhow::bail!("max-images must be at least 1");
    }
    validate_polling_bounds(poll_interval, timeout)?;

    let request = GenerationRequest {
        model,
        prompt: args.prompt,
        inputs: args.images.iter().map(|s| MediaReference::parse(s)).collect(),
        watermark: !args.no_watermark,
        options: GenerationOptions::Image(ImageOptions {
            size,
            sequential: args.sequential,
            max_images: args.max_images,
            enable_search: args.search,
        }),
    };

    let backend = ArkBackend::from_config(&config)?;
    let engine = PollEngine::new(poll_interval, timeout);
    let outcome = pipeline::run(&backend, &request, &args.output, &engine, &StderrSink)?;

    // Success summary on stdout
    println!("Image generated successfully");
    println!("Job ID: {}", outcome.handle.id());
    for path in &outcome.written {
        println!("File: {}", path.display());
    }
    if let Some(generated) = outcome.result.generated_images {
        println!("Images generated: {generated}");
    }
    if let Some(tokens) = outcome.result.total_tokens {
        println!("Tokens used: {tokens}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_switches_model_unless_explicit() {
        let defaults = GenerationConfig::default();

        assert_eq!(resolve_model(None, false, &defaults), defaults.image_model);
        assert_eq!(resolve_model(None, true, &defaults), defaults.search_model);
        assert_eq!(
            resolve_model(Some("my-custom-model".to_string()), true, &defaults),
            "my-custom-model"
        );
    }
}
