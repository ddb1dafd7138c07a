//! Gemini `generateContent` backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, BackendErrorKind, GenerationBackend};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Calls the Gemini REST API with a single API key.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                BackendError::new(
                    BackendErrorKind::Other,
                    e.status().map(|s| s.as_u16()),
                    format!("HTTP error: {e}"),
                )
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BackendError::new(
                BackendErrorKind::Other,
                Some(status.as_u16()),
                format!("Failed to read response body: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(classify_error_body(status.as_u16(), &body));
        }

        parse_success_body(&body, status.as_u16())
    }
}

/// Maps a non-success response into a typed error, using the structured
/// `error.status` field when the body parses.
fn classify_error_body(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<GeminiError>(body) {
        Ok(parsed) => BackendError::from_status(
            status,
            parsed.error.status.as_deref(),
            parsed.error.message,
        ),
        Err(_) => BackendError::from_status(status, None, body),
    }
}

fn parse_success_body(body: &str, status: u16) -> Result<String, BackendError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        BackendError::new(
            BackendErrorKind::Other,
            Some(status),
            format!("JSON parse error: {e}"),
        )
    })?;

    if let Some(usage) = &parsed.usage_metadata {
        debug!(
            "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    parsed.text().ok_or_else(|| {
        BackendError::new(
            BackendErrorKind::Other,
            Some(status),
            "Gemini returned empty content",
        )
    })
}
