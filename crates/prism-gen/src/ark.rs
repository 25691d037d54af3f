//! Ark generation backend
//!
//! Talks to the Volcengine Ark task API: one POST to create a generation
//! job, GETs keyed by job id to poll it, and a plain GET of the returned
//! artifact URL(s). Response classification is by HTTP status code, so
//! agents are built with `http_status_as_error(false)` and non-2xx bodies
//! are read for their server-supplied message.

use crate::backend::{Artifact, ArtifactStream, GenerationBackend, GenerationResult, JobHandle, JobState};
use crate::config::PrismConfig;
use crate::request::{GenerationOptions, GenerationRequest};
use prism_core::{PrismError, Result};
use std::time::Duration;

const DEFAULT_ARK_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

/// Creation call budget; creation is a fast metadata operation
const SUBMIT_TIMEOUT_SECS: u64 = 30;
/// Per-poll budget, independent of the overall job timeout
const STATUS_TIMEOUT_SECS: u64 = 10;
/// Artifact bodies can be large
const DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Blocking HTTP backend for the Ark task API
pub struct ArkBackend {
    api_key: String,
    api_url: String,
}

impl ArkBackend {
    /// Create a backend from resolved config
    pub fn from_config(config: &PrismConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| {
                PrismError::ValidationError(
                    "Ark API key not configured. Set ARK_API_KEY or add to .prism/config.toml"
                        .to_string(),
                )
            })?
            .to_string();

        let api_url = config.api_url().unwrap_or(DEFAULT_ARK_URL).to_string();

        Ok(Self { api_key, api_url })
    }

    fn tasks_url(&self) -> String {
        format!("{}/contents/generations/tasks", self.api_url)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl GenerationBackend for ArkBackend {
    fn submit(&self, request: &GenerationRequest) -> Result<JobHandle> {
        request.validate()?;
        let payload = build_payload(request)?;

        let agent = build_agent(SUBMIT_TIMEOUT_SECS);
        let mut response = agent
            .post(&self.tasks_url())
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
            .send_json(&payload)
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response
                .body_mut()
                .read_json::<serde_json::Value>()
                .unwrap_or(serde_json::Value::Null);
            return Err(classify_submit_failure(status, &body));
        }

        let body: serde_json::Value = response
            .body_mut()
            .read_json()
            .map_err(|e| PrismError::ProtocolError(format!("creation response is not JSON: {}", e)))?;
        parse_submit_response(&body)
    }

    fn fetch_status(&self, handle: &JobHandle) -> Result<JobState> {
        let url = format!("{}/{}", self.tasks_url(), handle.id());

        let agent = build_agent(STATUS_TIMEOUT_SECS);
        let mut response = agent
            .get(&url)
            .header("Authorization", &self.bearer())
            .call()
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            // Any status-code failure on a poll is a server hiccup as far
            // as the engine is concerned; it retries up to the cap.
            return Err(PrismError::ServerError(format!(
                "status query failed (HTTP {})",
                status
            )));
        }

        let body: serde_json::Value = response
            .body_mut()
            .read_json()
            .map_err(|e| PrismError::ProtocolError(format!("status response is not JSON: {}", e)))?;
        parse_status_response(&body)
    }

    fn fetch_artifact(&self, url: &str) -> Result<ArtifactStream> {
        let agent = build_agent(DOWNLOAD_TIMEOUT_SECS);
        let response = agent.get(url).call().map_err(classify_transport)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(PrismError::ServerError(format!(
                "artifact download failed (HTTP {})",
                status
            )));
        }

        let total_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        Ok(ArtifactStream {
            total_bytes,
            reader: Box::new(response.into_body().into_reader()),
        })
    }
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .http_status_as_error(false)
        .build();
    config.into()
}

fn classify_transport(e: ureq::Error) -> PrismError {
    match e {
        ureq::Error::Timeout(_) => PrismError::TransportError(format!("request timed out: {}", e)),
        _ => PrismError::TransportError(format!("connection failed: {}", e)),
    }
}

/// Build the creation payload in the Ark wire format
pub fn build_payload(request: &GenerationRequest) -> Result<serde_json::Value> {
    let canonical: Vec<String> = request
        .inputs
        .iter()
        .map(|input| input.canonicalize())
        .collect::<Result<_>>()?;

    match &request.options {
        GenerationOptions::Video(opts) => {
            let mut content = vec![serde_json::json!({
                "type": "text",
                "text": request.prompt,
            })];
            for url in &canonical {
                content.push(serde_json::json!({
                    "type": "image_url",
                    "image_url": { "url": url },
                }));
            }

            Ok(serde_json::json!({
                "model": request.model,
                "content": content,
                "duration": opts.duration_secs,
                "ratio": opts.ratio,
                "generate_audio": opts.generate_audio,
                "watermark": request.watermark,
            }))
        }
        GenerationOptions::Image(opts) => {
            let mut payload = serde_json::json!({
                "model": request.model,
                "prompt": request.prompt,
                "size": opts.size,
                "response_format": "url",
                "watermark": request.watermark,
            });

            match canonical.len() {
                0 => {}
                1 => payload["image"] = serde_json::json!(canonical[0]),
                _ => {
                    payload["image"] = serde_json::json!(canonical);
                    // Multiple references mean fusion, not a group
                    payload["sequential_image_generation"] = serde_json::json!("disabled");
                }
            }

            if opts.sequential {
                payload["sequential_image_generation"] = serde_json::json!("auto");
                payload["sequential_image_generation_options"] =
                    serde_json::json!({ "max_images": opts.max_images });
            }

            if opts.enable_search {
                payload["enable_online_search"] = serde_json::json!(true);
            }

            Ok(payload)
        }
    }
}

/// Map a non-2xx creation response to a typed error
pub fn classify_submit_failure(status: u16, body: &serde_json::Value) -> PrismError {
    let msg = extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        401 => PrismError::AuthError("API key invalid or expired (check ARK_API_KEY)".to_string()),
        403 => PrismError::PermissionError(
            "API key lacks generation permission for this model".to_string(),
        ),
        429 => PrismError::RateLimitError("request quota exceeded, retry later".to_string()),
        400 => PrismError::ValidationError(msg),
        _ => PrismError::ServerError(msg),
    }
}

/// Pull the server-supplied message out of an error body, if any
fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::Object(detail) => detail
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        other => Some(other.to_string()),
    }
}

/// Parse a creation response into a job handle
pub fn parse_submit_response(body: &serde_json::Value) -> Result<JobHandle> {
    body.get("id")
        .and_then(|v| v.as_str())
        .map(JobHandle::new)
        .ok_or_else(|| {
            PrismError::ProtocolError("creation response missing job identifier".to_string())
        })
}

/// Parse a status response into a job state
pub fn parse_status_response(body: &serde_json::Value) -> Result<JobState> {
    let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("");

    match status {
        "succeeded" => Ok(JobState::Succeeded(parse_result(body)?)),
        "failed" => Ok(JobState::Failed(
            extract_error_message(body).unwrap_or_else(|| "unknown error".to_string()),
        )),
        "queued" => Ok(JobState::Queued),
        // Unrecognized statuses are assumed still in flight
        _ => Ok(JobState::Running),
    }
}

/// Extract artifacts and metadata from a succeeded status body.
///
/// A succeeded payload without any usable artifact shape is a protocol
/// error, not a transient condition.
fn parse_result(body: &serde_json::Value) -> Result<GenerationResult> {
    let mut result = GenerationResult {
        resolution: body
            .get("resolution")
            .and_then(|v| v.as_str())
            .map(String::from),
        ratio: body.get("ratio").and_then(|v| v.as_str()).map(String::from),
        duration_secs: body.get("duration").and_then(|v| v.as_u64()),
        frames_per_second: body.get("framespersecond").and_then(|v| v.as_u64()),
        has_audio: body
            .get("content")
            .and_then(|c| c.get("has_audio"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        generated_images: body
            .get("usage")
            .and_then(|u| u.get("generated_images"))
            .and_then(|v| v.as_u64()),
        total_tokens: body
            .get("usage")
            .and_then(|u| u.get("total_tokens"))
            .and_then(|v| v.as_u64()),
        ..Default::default()
    };

    if let Some(url) = body
        .get("content")
        .and_then(|c| c.get("video_url"))
        .and_then(|v| v.as_str())
    {
        result.artifacts.push(Artifact {
            url: Some(url.to_string()),
            size: None,
        });
        return Ok(result);
    }

    if let Some(entries) = body.get("data").and_then(|d| d.as_array()) {
        if entries.is_empty() {
            return Err(PrismError::ProtocolError(
                "success payload has an empty artifact list".to_string(),
            ));
        }
        for entry in entries {
            result.artifacts.push(Artifact {
                url: entry.get("url").and_then(|v| v.as_str()).map(String::from),
                size: entry.get("size").and_then(|v| v.as_str()).map(String::from),
            });
        }
        return Ok(result);
    }

    Err(PrismError::ProtocolError(
        "success payload missing artifact URL".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaReference;
    use crate::request::{ImageOptions, VideoOptions};

    fn video_request() -> GenerationRequest {
        GenerationRequest {
            model: "doubao-seedance-1-5-pro-251215".to_string(),
            prompt: "a cat playing on the grass".to_string(),
            inputs: vec![],
            watermark: true,
            options: GenerationOptions::Video(VideoOptions {
                duration_secs: 5,
                ratio: "adaptive".to_string(),
                generate_audio: false,
            }),
        }
    }

    fn image_request() -> GenerationRequest {
        GenerationRequest {
            model: "doubao-seedream-4-5-251128".to_string(),
            prompt: "a cute kitten".to_string(),
            inputs: vec![],
            watermark: true,
            options: GenerationOptions::Image(ImageOptions {
                size: "2K".to_string(),
                sequential: false,
                max_images: 1,
                enable_search: false,
            }),
        }
    }

    #[test]
    fn test_parse_submit_response() {
        let body: serde_json::Value =
            serde_json::from_str(r#"{"id":"cgt-2024-xxxx"}"#).unwrap();
        let handle = parse_submit_response(&body).unwrap();
        assert_eq!(handle.id(), "cgt-2024-xxxx");
    }

    #[test]
    fn test_parse_submit_response_missing_id() {
        let body: serde_json::Value = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(matches!(
            parse_submit_response(&body),
            Err(PrismError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_classify_submit_failures() {
        let body = serde_json::json!({"error": {"message": "bad ratio"}});
        assert!(matches!(
            classify_submit_failure(401, &body),
            PrismError::AuthError(_)
        ));
        assert!(matches!(
            classify_submit_failure(403, &body),
            PrismError::PermissionError(_)
        ));
        assert!(matches!(
            classify_submit_failure(429, &body),
            PrismError::RateLimitError(_)
        ));
        match classify_submit_failure(400, &body) {
            PrismError::ValidationError(msg) => assert_eq!(msg, "bad ratio"),
            other => panic!("expected ValidationError, got {}", other),
        }
        assert!(matches!(
            classify_submit_failure(503, &body),
            PrismError::ServerError(_)
        ));
    }

    #[test]
    fn test_classify_submit_failure_undecodable_body() {
        match classify_submit_failure(500, &serde_json::Value::Null) {
            PrismError::ServerError(msg) => assert_eq!(msg, "HTTP 500"),
            other => panic!("expected ServerError, got {}", other),
        }
    }

    #[test]
    fn test_classify_submit_failure_string_error() {
        let body = serde_json::json!({"error": "overloaded"});
        match classify_submit_failure(500, &body) {
            PrismError::ServerError(msg) => assert!(msg.contains("overloaded")),
            other => panic!("expected ServerError, got {}", other),
        }
    }

    #[test]
    fn test_parse_status_in_flight() {
        let queued: serde_json::Value =
            serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert!(matches!(
            parse_status_response(&queued).unwrap(),
            JobState::Queued
        ));

        let running: serde_json::Value =
            serde_json::from_str(r#"{"status":"running"}"#).unwrap();
        assert!(matches!(
            parse_status_response(&running).unwrap(),
            JobState::Running
        ));
    }

    #[test]
    fn test_parse_status_unknown_is_in_flight() {
        let body: serde_json::Value =
            serde_json::from_str(r#"{"status":"preprocessing"}"#).unwrap();
        assert!(matches!(
            parse_status_response(&body).unwrap(),
            JobState::Running
        ));
    }

    #[test]
    fn test_parse_status_failed() {
        let body = serde_json::json!({
            "status": "failed",
            "error": {"message": "content policy violation"}
        });
        match parse_status_response(&body).unwrap() {
            JobState::Failed(msg) => assert_eq!(msg, "content policy violation"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_status_failed_without_message() {
        let body = serde_json::json!({"status": "failed"});
        match parse_status_response(&body).unwrap() {
            JobState::Failed(msg) => assert_eq!(msg, "unknown error"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_succeeded_video() {
        let body = serde_json::json!({
            "status": "succeeded",
            "resolution": "1080p",
            "ratio": "16:9",
            "duration": 5,
            "framespersecond": 24,
            "content": {
                "video_url": "https://cdn.example.com/out.mp4",
                "has_audio": true
            }
        });
        match parse_status_response(&body).unwrap() {
            JobState::Succeeded(result) => {
                assert_eq!(result.artifacts.len(), 1);
                assert_eq!(
                    result.artifacts[0].url.as_deref(),
                    Some("https://cdn.example.com/out.mp4")
                );
                assert_eq!(result.resolution.as_deref(), Some("1080p"));
                assert_eq!(result.duration_secs, Some(5));
                assert_eq!(result.frames_per_second, Some(24));
                assert!(result.has_audio);
            }
            other => panic!("expected Succeeded, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_succeeded_image_group_with_gap() {
        let body = serde_json::json!({
            "status": "succeeded",
            "data": [
                {"url": "https://cdn.example.com/1.png", "size": "2048x2048"},
                {"size": "2048x2048"},
                {"url": "https://cdn.example.com/3.png"}
            ],
            "usage": {"generated_images": 3, "total_tokens": 1234}
        });
        match parse_status_response(&body).unwrap() {
            JobState::Succeeded(result) => {
                assert_eq!(result.artifacts.len(), 3);
                assert!(result.artifacts[0].url.is_some());
                assert!(result.artifacts[1].url.is_none());
                assert!(result.artifacts[2].url.is_some());
                assert_eq!(result.generated_images, Some(3));
                assert_eq!(result.total_tokens, Some(1234));
            }
            other => panic!("expected Succeeded, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_succeeded_malformed_is_protocol_error() {
        let body = serde_json::json!({"status": "succeeded", "content": {}});
        assert!(matches!(
            parse_status_response(&body),
            Err(PrismError::ProtocolError(_))
        ));

        let body = serde_json::json!({"status": "succeeded", "data": []});
        assert!(matches!(
            parse_status_response(&body),
            Err(PrismError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_build_video_payload() {
        let mut request = video_request();
        request.inputs.push(MediaReference::RemoteUrl(
            "https://example.com/ref.jpg".to_string(),
        ));

        let payload = build_payload(&request).unwrap();
        assert_eq!(payload["model"], "doubao-seedance-1-5-pro-251215");
        assert_eq!(payload["duration"], 5);
        assert_eq!(payload["ratio"], "adaptive");
        assert_eq!(payload["generate_audio"], false);
        assert_eq!(payload["watermark"], true);

        let content = payload["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "a cat playing on the grass");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "https://example.com/ref.jpg");
    }

    #[test]
    fn test_build_image_payload_plain() {
        let payload = build_payload(&image_request()).unwrap();
        assert_eq!(payload["model"], "doubao-seedream-4-5-251128");
        assert_eq!(payload["prompt"], "a cute kitten");
        assert_eq!(payload["size"], "2K");
        assert_eq!(payload["response_format"], "url");
        assert!(payload.get("image").is_none());
        assert!(payload.get("sequential_image_generation").is_none());
        assert!(payload.get("enable_online_search").is_none());
    }

    #[test]
    fn test_build_image_payload_fusion_and_group() {
        let mut request = image_request();
        request.inputs = vec![
            MediaReference::RemoteUrl("https://example.com/a.jpg".to_string()),
            MediaReference::RemoteUrl("https://example.com/b.jpg".to_string()),
        ];
        let payload = build_payload(&request).unwrap();
        assert!(payload["image"].is_array());
        assert_eq!(payload["sequential_image_generation"], "disabled");

        let mut request = image_request();
        if let GenerationOptions::Image(opts) = &mut request.options {
            opts.sequential = true;
            opts.max_images = 4;
            opts.enable_search = true;
        }
        let payload = build_payload(&request).unwrap();
        assert_eq!(payload["sequential_image_generation"], "auto");
        assert_eq!(
            payload["sequential_image_generation_options"]["max_images"],
            4
        );
        assert_eq!(payload["enable_online_search"], true);
    }

    #[test]
    fn test_build_payload_rejects_missing_local_file() {
        let mut request = video_request();
        request.inputs.push(MediaReference::LocalPath(
            "/definitely/not/here.png".into(),
        ));
        assert!(matches!(
            build_payload(&request),
            Err(PrismError::ValidationError(_))
        ));
    }
}
