//! Assessment operations — the two calls the workflow makes against the
//! generation endpoint.
//!
//! `submit_assessment` is the full structured case analysis. `review_image`
//! is the lightweight X-ray-only prose review. They share a client but differ
//! in reply handling: an empty reply is an error for the former and a fixed
//! placeholder for the latter.

use tracing::{info, warn};

use crate::imaging::ImageData;

use super::parser::parse_assessment_reply;
use super::prompt::XRAY_REVIEW_PROMPT;
use super::types::{
    AssessmentRequest, AssessmentResult, GenerationOptions, GenerativeClient, RequestPart,
};
use super::AssessmentError;

/// Reasoning budget for the full case assessment.
const ASSESSMENT_THINKING_BUDGET: u32 = 16_384;

/// Reasoning budget for the single-image X-ray review.
const XRAY_THINKING_BUDGET: u32 = 8_192;

/// Placeholder returned when the X-ray review succeeds but produces no text.
pub const NO_REVIEW_TEXT: &str = "No analysis could be generated.";

/// Submit the full case assessment and parse the structured reply.
pub async fn submit_assessment<C: GenerativeClient>(
    client: &C,
    request: &AssessmentRequest,
) -> Result<AssessmentResult, AssessmentError> {
    info!(images = request.images.len(), "submitting case assessment");

    let options = GenerationOptions {
        structured_json: true,
        thinking_budget: ASSESSMENT_THINKING_BUDGET,
    };
    let reply = client.generate(&request.parts(), &options).await?;
    if reply.is_empty() {
        return Err(AssessmentError::Unavailable {
            reason: "empty reply from endpoint".into(),
        });
    }

    match parse_assessment_reply(&reply) {
        Ok(result) => {
            info!(risk_level = %result.risk_level, "assessment complete");
            Ok(result)
        }
        Err(e) => {
            warn!(error = ?e, "assessment reply failed to parse");
            Err(e)
        }
    }
}

/// Review a single X-ray image in isolation.
///
/// The reply is free prose, returned trimmed. A successful call that produces
/// no text yields [`NO_REVIEW_TEXT`] rather than an error.
pub async fn review_image<C: GenerativeClient>(
    client: &C,
    image: &ImageData,
) -> Result<String, AssessmentError> {
    info!("submitting X-ray quick review");

    let parts = [
        RequestPart::Text(XRAY_REVIEW_PROMPT.to_string()),
        RequestPart::InlineImage {
            mime_type: image.mime_type.clone(),
            payload: image.payload.clone(),
        },
    ];
    let options = GenerationOptions {
        structured_json: false,
        thinking_budget: XRAY_THINKING_BUDGET,
    };
    let reply = client.generate(&parts, &options).await?;
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Ok(NO_REVIEW_TEXT.to_string());
    }
    Ok(trimmed.to_string())
}
