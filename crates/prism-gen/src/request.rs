//! Generation request types
//!
//! A request is built once by the caller and never mutated afterwards;
//! validation happens at submission time.

use crate::media::MediaReference;
use prism_core::{PrismError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of media a request produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// Options specific to video generation
#[derive(Debug, Clone)]
pub struct VideoOptions {
    /// Clip length in seconds
    pub duration_secs: u32,
    /// Aspect ratio ("adaptive", "16:9", "9:16", "1:1")
    pub ratio: String,
    /// Generate a synchronized audio track
    pub generate_audio: bool,
}

/// Options specific to image generation
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Output size class ("1K", "2K", "4K")
    pub size: String,
    /// Generate a themed group of images instead of a single one
    pub sequential: bool,
    /// Upper bound on group size when `sequential` is set
    pub max_images: u32,
    /// Let the model consult online search while generating
    pub enable_search: bool,
}

/// Kind-specific generation options
#[derive(Debug, Clone)]
pub enum GenerationOptions {
    Video(VideoOptions),
    Image(ImageOptions),
}

/// A fully-populated request, immutable once built
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Remote model identifier
    pub model: String,
    /// Generation prompt (required, non-empty)
    pub prompt: String,
    /// Zero or more reference inputs
    pub inputs: Vec<MediaReference>,
    /// Stamp a watermark on the output
    pub watermark: bool,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn kind(&self) -> MediaKind {
        match self.options {
            GenerationOptions::Video(_) => MediaKind::Video,
            GenerationOptions::Image(_) => MediaKind::Image,
        }
    }

    /// Local precondition checks, run once before submission
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(PrismError::ValidationError(
                "prompt must not be empty".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(PrismError::ValidationError(
                "model identifier must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: "doubao-seedance-1-5-pro-251215".to_string(),
            prompt: prompt.to_string(),
            inputs: vec![],
            watermark: true,
            options: GenerationOptions::Video(VideoOptions {
                duration_secs: 5,
                ratio: "adaptive".to_string(),
                generate_audio: false,
            }),
        }
    }

    #[test]
    fn test_validate_accepts_plain_prompt() {
        assert!(video_request("a cat on the grass").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_prompt() {
        assert!(matches!(
            video_request("").validate(),
            Err(PrismError::ValidationError(_))
        ));
        assert!(matches!(
            video_request("   ").validate(),
            Err(PrismError::ValidationError(_))
        ));
    }

    #[test]
    fn test_kind_follows_options() {
        assert_eq!(video_request("x").kind(), MediaKind::Video);

        let image = GenerationRequest {
            model: "doubao-seedream-4-5-251128".to_string(),
            prompt: "x".to_string(),
            inputs: vec![],
            watermark: true,
            options: GenerationOptions::Image(ImageOptions {
                size: "2K".to_string(),
                sequential: false,
                max_images: 1,
                enable_search: false,
            }),
        };
        assert_eq!(image.kind(), MediaKind::Image);
    }
}
