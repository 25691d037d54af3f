//! Media reference normalization
//!
//! Converts a heterogeneous input reference (remote URL, inline data URL,
//! local path) into the single canonical string form the remote API
//! accepts. Remote URLs are passed through without an existence check;
//! the remote side validates them.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use prism_core::{PrismError, Result};
use std::path::{Path, PathBuf};

/// Extension to MIME type table for local image files
const EXT_TO_MIME: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("heic", "image/heic"),
];

/// Applied when the extension is not in the table. The remote service
/// validates content independently, so an unknown extension is a warning,
/// never an abort.
const FALLBACK_MIME: &str = "image/jpeg";

/// A single input reference in one of the three accepted forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaReference {
    /// An `http://` or `https://` URL, submitted unchanged
    RemoteUrl(String),
    /// An inline `data:<mime>;base64,<payload>` reference
    InlineData(String),
    /// A local filesystem path, converted to inline data at submission
    LocalPath(PathBuf),
}

impl MediaReference {
    /// Classify a raw reference string. A `file://` prefix is stripped
    /// before local-path handling.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            MediaReference::RemoteUrl(raw.to_string())
        } else if raw.starts_with("data:") {
            MediaReference::InlineData(raw.to_string())
        } else {
            let path = raw.strip_prefix("file://").unwrap_or(raw);
            MediaReference::LocalPath(PathBuf::from(path))
        }
    }

    /// Produce the canonical string form the remote API accepts.
    ///
    /// Remote URLs and inline data are already canonical. Local paths are
    /// read fully into memory and base64-encoded; no size cap is enforced
    /// here since the remote service enforces its own limits.
    pub fn canonicalize(&self) -> Result<String> {
        match self {
            MediaReference::RemoteUrl(url) => Ok(url.clone()),
            MediaReference::InlineData(data) => Ok(data.clone()),
            MediaReference::LocalPath(path) => encode_local_file(path),
        }
    }
}

/// Normalize a raw reference string into the canonical submission form
pub fn normalize(raw: &str) -> Result<String> {
    MediaReference::parse(raw).canonicalize()
}

fn encode_local_file(path: &Path) -> Result<String> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if !abs.exists() {
        return Err(PrismError::ValidationError(format!(
            "Image file not found: {}",
            abs.display()
        )));
    }
    if !abs.is_file() {
        return Err(PrismError::ValidationError(format!(
            "Path is not a file: {}",
            abs.display()
        )));
    }

    let mime = mime_for(&abs);
    let bytes = std::fs::read(&abs)?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let mapped = ext
        .as_deref()
        .and_then(|e| EXT_TO_MIME.iter().find(|(k, _)| *k == e))
        .map(|(_, v)| *v);

    match mapped {
        Some(mime) => mime,
        None => {
            tracing::warn!(
                "{} may not be a valid image format, assuming {}",
                path.display(),
                FALLBACK_MIME
            );
            FALLBACK_MIME
        }
    }
}
