//! Request and result types for the assessment pipeline, plus the client seam.

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::AssessmentError;
use crate::imaging::ImageData;
use crate::models::{Modality, RiskLevel};

/// One part of an outgoing generation request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    InlineImage { mime_type: String, payload: String },
}

/// Per-call generation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Ask the endpoint for a structured JSON reply instead of prose.
    pub structured_json: bool,
    /// Reasoning-token budget for the call.
    pub thinking_budget: u32,
}

/// Seam to the hosted generation endpoint.
///
/// One operation: ordered parts in, raw model text out (possibly empty —
/// emptiness policy belongs to the caller, which differs per operation).
/// Production is `GeminiClient`; tests script replies through the mocks in
/// `gemini`.
pub trait GenerativeClient {
    fn generate(
        &self,
        parts: &[RequestPart],
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, AssessmentError>> + Send;
}

/// An attached image together with the modality slot it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledImage {
    pub modality: Modality,
    pub image: ImageData,
}

/// A fully built assessment request: the narrative prompt plus the attached
/// images in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRequest {
    pub prompt: String,
    pub images: Vec<LabeledImage>,
}

impl AssessmentRequest {
    /// Flatten to the wire part list: the prompt first, then, per image, a
    /// fixed text label followed by the inline image.
    pub fn parts(&self) -> Vec<RequestPart> {
        let mut parts = Vec::with_capacity(1 + self.images.len() * 2);
        parts.push(RequestPart::Text(self.prompt.clone()));
        for labeled in &self.images {
            parts.push(RequestPart::Text(
                labeled.modality.attachment_label().to_string(),
            ));
            parts.push(RequestPart::InlineImage {
                mime_type: labeled.image.mime_type.clone(),
                payload: labeled.image.payload.clone(),
            });
        }
        parts
    }
}

/// One completed risk assessment as returned by the endpoint.
///
/// Replaced wholesale on every successful run; never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub risk_level: RiskLevel,
    pub summary: String,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    /// Exact reply text, kept for audit and export.
    pub raw_response: String,
}
