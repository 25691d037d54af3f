//! Artifact downloader
//!
//! Streams artifact bodies to disk in fixed-size chunks, creating parent
//! directories first. Multi-artifact results are written sequentially so
//! ordering and progress stay deterministic.

use crate::backend::{GenerationBackend, GenerationResult};
use crate::progress::{ProgressEvent, ProgressSink};
use prism_core::{PrismError, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const CHUNK_SIZE: usize = 8192;

/// Stream one artifact to `dest`, emitting per-chunk progress when the
/// response carries a total-size hint.
pub fn download_artifact(
    backend: &dyn GenerationBackend,
    url: &str,
    dest: &Path,
    progress: &dyn ProgressSink,
) -> Result<()> {
    let stream = backend.fetch_artifact(url)?;

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(dest)?;
    let mut reader = stream.reader;
    let mut buf = [0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| PrismError::TransportError(format!("download interrupted: {}", e)))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        downloaded += n as u64;

        if let Some(total) = stream.total_bytes {
            if total > 0 {
                let percent = (downloaded.saturating_mul(100) / total).min(100) as u8;
                progress.on_event(ProgressEvent::DownloadProgress {
                    percent,
                    downloaded_bytes: downloaded,
                    total_bytes: total,
                });
            }
        }
    }

    progress.on_event(ProgressEvent::DownloadFinished {
        path: dest.to_path_buf(),
    });
    Ok(())
}

/// Download every artifact of a result.
///
/// A single-artifact result is written exactly at `output`, and any
/// failure aborts. A multi-artifact result is written as
/// `{stem}_{index}{suffix}` in the original order; artifacts with a
/// missing URL or a failed download are skipped without aborting the
/// rest, and the batch only fails if nothing at all could be written.
pub fn download_all(
    backend: &dyn GenerationBackend,
    result: &GenerationResult,
    output: &Path,
    progress: &dyn ProgressSink,
) -> Result<Vec<PathBuf>> {
    match result.artifacts.len() {
        0 => Err(PrismError::ProtocolError(
            "result contains no artifacts".to_string(),
        )),
        1 => {
            let url = result.artifacts[0].url.as_deref().ok_or_else(|| {
                PrismError::ProtocolError("artifact URL missing from result".to_string())
            })?;
            progress.on_event(ProgressEvent::DownloadStarted { index: 1, total: 1 });
            download_artifact(backend, url, output, progress)?;
            Ok(vec![output.to_path_buf()])
        }
        total => {
            let mut written = Vec::new();
            for (i, artifact) in result.artifacts.iter().enumerate() {
                let index = i + 1;
                let Some(url) = artifact.url.as_deref() else {
                    tracing::warn!("artifact {} has no URL, skipping", index);
                    progress.on_event(ProgressEvent::ArtifactSkipped {
                        index,
                        reason: "no URL in result".to_string(),
                    });
                    continue;
                };

                let dest = indexed_path(output, index);
                progress.on_event(ProgressEvent::DownloadStarted { index, total });
                match download_artifact(backend, url, &dest, progress) {
                    Ok(()) => written.push(dest),
                    Err(e) => {
                        tracing::warn!("artifact {} failed: {}, continuing", index, e);
                        progress.on_event(ProgressEvent::ArtifactSkipped {
                            index,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if written.is_empty() {
                return Err(PrismError::ProtocolError(
                    "no artifact of the result could be downloaded".to_string(),
                ));
            }
            Ok(written)
        }
    }
}

/// `{stem}_{index}{suffix}` next to the requested output path
fn indexed_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    let suffix = output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    output.with_file_name(format!("{}_{}{}", stem, index, suffix))
}
