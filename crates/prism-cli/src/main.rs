//! Prism CLI - generate videos and images via the Ark generation API

mod commands;

use clap::{Parser, Subcommand};
use commands::{image, video};

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Submit generative-media jobs and download the results", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video from a prompt, optionally with reference images
    Video(video::VideoArgs),

    /// Generate one or more images from a prompt
    Image(image::ImageArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Video(args) => video::run(args),
        Commands::Image(args) => image::run(args),
    };

    // One human-readable summary per fatal error, non-zero exit. An
    // interrupt is not caught here: the default SIGINT disposition kills
    // the process with its own distinct exit status.
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
