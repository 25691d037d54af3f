//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variable: `ARK_API_KEY`
//! 2. Project-local: `.prism/config.toml`
//! 3. Global: `~/.prism/config.toml`
//!
//! The resolved value is loaded once per invocation and threaded into the
//! backend at construction; nothing here is process-global.

use prism_core::{PrismError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Remote service credentials and endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArkConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Generation defaults the CLI falls back to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_video_model")]
    pub video_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Model used when online search is requested
    #[serde(default = "default_search_model")]
    pub search_model: String,
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    #[serde(default = "default_ratio")]
    pub ratio: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            video_model: default_video_model(),
            image_model: default_image_model(),
            search_model: default_search_model(),
            duration_secs: default_duration(),
            ratio: default_ratio(),
            size: default_size(),
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_video_model() -> String {
    "doubao-seedance-1-5-pro-251215".to_string()
}
fn default_image_model() -> String {
    "doubao-seedream-4-5-251128".to_string()
}
fn default_search_model() -> String {
    "doubao-seedream-5-0-260128".to_string()
}
fn default_duration() -> u32 {
    5
}
fn default_ratio() -> String {
    "adaptive".to_string()
}
fn default_size() -> String {
    "2K".to_string()
}
fn default_poll_interval() -> u64 {
    5
}
fn default_timeout() -> u64 {
    300
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrismConfigFile {
    #[serde(default)]
    pub ark: ArkConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Resolved configuration with environment overrides applied
#[derive(Debug, Clone)]
pub struct PrismConfig {
    pub ark: ArkConfig,
    pub generation: GenerationConfig,
}

impl PrismConfig {
    /// Load config with layered precedence: global < project < env var
    pub fn load() -> Result<Self> {
        let mut config = PrismConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".prism/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config);

        Ok(PrismConfig {
            ark: config.ark,
            generation: config.generation,
        })
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(PrismConfig {
            ark: config.ark,
            generation: config.generation,
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.ark.api_key.as_deref()
    }

    pub fn api_url(&self) -> Option<&str> {
        self.ark.api_url.as_deref()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".prism").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<PrismConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: PrismConfigFile = toml::from_str(&content).map_err(|e| {
            PrismError::ValidationError(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    fn merge_into(base: &mut PrismConfigFile, overlay: PrismConfigFile) {
        if overlay.ark.api_key.is_some() {
            base.ark.api_key = overlay.ark.api_key;
        }
        if overlay.ark.api_url.is_some() {
            base.ark.api_url = overlay.ark.api_url;
        }

        let defaults = GenerationConfig::default();
        if overlay.generation.video_model != defaults.video_model {
            base.generation.video_model = overlay.generation.video_model;
        }
        if overlay.generation.image_model != defaults.image_model {
            base.generation.image_model = overlay.generation.image_model;
        }
        if overlay.generation.search_model != defaults.search_model {
            base.generation.search_model = overlay.generation.search_model;
        }
        if overlay.generation.duration_secs != defaults.duration_secs {
            base.generation.duration_secs = overlay.generation.duration_secs;
        }
        if overlay.generation.ratio != defaults.ratio {
            base.generation.ratio = overlay.generation.ratio;
        }
        if overlay.generation.size != defaults.size {
            base.generation.size = overlay.generation.size;
        }
        if overlay.generation.poll_interval_secs != defaults.poll_interval_secs {
            base.generation.poll_interval_secs = overlay.generation.poll_interval_secs;
        }
        if overlay.generation.timeout_secs != defaults.timeout_secs {
            base.generation.timeout_secs = overlay.generation.timeout_secs;
        }
    }

    fn apply_env_overrides(config: &mut PrismConfigFile) {
        if let Ok(key) = std::env::var("ARK_API_KEY") {
            if !key.is_empty() {
                config.ark.api_key = Some(key);
            }
        }
    }
}
