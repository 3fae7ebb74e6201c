//! Gemini HTTP client — transport layer for the hosted generateContent API.
//!
//! Speaks the v1beta wire format: camelCase JSON bodies, inline base64 image
//! data, API key in the `x-goog-api-key` header. Everything above this layer
//! works with [`RequestPart`] lists and plain reply text.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config;

use super::types::{GenerationOptions, GenerativeClient, RequestPart};
use super::AssessmentError;

/// Bound on establishing the connection only. Generation itself is unbounded;
/// a deep analysis over several images can legitimately run for minutes.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the hosted Gemini endpoint.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    /// Client configured from the environment: API key (required), endpoint
    /// base and model id (defaulted).
    pub fn from_env() -> Result<Self, AssessmentError> {
        let api_key = config::api_key()?;
        Ok(Self::new(&config::api_base(), &config::model_id(), &api_key))
    }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

fn build_wire_request(
    parts: &[RequestPart],
    options: &GenerationOptions,
) -> GenerateContentRequest {
    let wire_parts = parts
        .iter()
        .map(|part| match part {
            RequestPart::Text(text) => Part {
                text: Some(text.clone()),
                inline_data: None,
            },
            RequestPart::InlineImage { mime_type, payload } => Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.clone(),
                    data: payload.clone(),
                }),
            },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![Content { parts: wire_parts }],
        generation_config: GenerationConfig {
            response_mime_type: options.structured_json.then_some("application/json"),
            thinking_config: ThinkingConfig {
                thinking_budget: options.thinking_budget,
            },
        },
    }
}

/// Text of the first candidate, with multi-part replies concatenated.
fn extract_text(envelope: GenerateContentResponse) -> String {
    envelope
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect()
        })
        .unwrap_or_default()
}

impl GenerativeClient for GeminiClient {
    async fn generate(
        &self,
        parts: &[RequestPart],
        options: &GenerationOptions,
    ) -> Result<String, AssessmentError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = build_wire_request(parts, options);
        debug!(
            model = %self.model,
            parts = parts.len(),
            structured = options.structured_json,
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_connect() {
                    format!("could not reach {}", self.base_url)
                } else if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                AssessmentError::Unavailable { reason }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "generation endpoint returned an error");
            return Err(AssessmentError::Unavailable {
                reason: format!("endpoint returned status {status}: {body}"),
            });
        }

        let envelope: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| AssessmentError::Unavailable {
                    reason: format!("could not read reply body: {e}"),
                })?;

        let reply = extract_text(envelope);
        debug!(reply_len = reply.len(), "generateContent reply received");
        Ok(reply)
    }
}

// ─── Test doubles ────────────────────────────────────────────────────────────

/// One call captured by [`MockGenerativeClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub parts: Vec<RequestPart>,
    pub options: GenerationOptions,
}

/// Mock client for tests — replies with a fixed text and records every call.
pub struct MockGenerativeClient {
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGenerativeClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }
}

impl GenerativeClient for MockGenerativeClient {
    async fn generate(
        &self,
        parts: &[RequestPart],
        options: &GenerationOptions,
    ) -> Result<String, AssessmentError> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(RecordedCall {
                parts: parts.to_vec(),
                options: *options,
            });
        Ok(self.reply.clone())
    }
}

/// Mock client that always fails with a transport error.
pub struct FailingGenerativeClient {
    reason: String,
}

impl FailingGenerativeClient {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl GenerativeClient for FailingGenerativeClient {
    async fn generate(
        &self,
        _parts: &[RequestPart],
        _options: &GenerationOptions,
    ) -> Result<String, AssessmentError> {
        Err(AssessmentError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}
