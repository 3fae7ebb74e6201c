//! Reply parsing — strict conversion of endpoint text into an assessment result.

use std::str::FromStr;

use serde::Deserialize;

use super::types::AssessmentResult;
use super::AssessmentError;
use crate::models::RiskLevel;

/// Wire shape of the structured reply. The endpoint is asked for camelCase
/// keys; unknown extra keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    risk_level: String,
    summary: String,
    findings: Vec<String>,
    recommendations: Vec<String>,
}

/// Strip a ```json fence when the model wraps its reply in one despite the
/// structured-output request; otherwise parse the whole trimmed reply.
fn extract_json(reply: &str) -> &str {
    if let Some(start) = reply.find("```json") {
        let content_start = start + 7;
        if let Some(end) = reply[content_start..].find("```") {
            return reply[content_start..content_start + end].trim();
        }
    }
    reply.trim()
}

/// Parse a raw reply into an [`AssessmentResult`].
///
/// Every field must be present and the risk level must match one of the four
/// known values exactly; anything else is a [`AssessmentError::MalformedResponse`].
/// The reply text is carried along untouched for audit and export.
pub fn parse_assessment_reply(reply: &str) -> Result<AssessmentResult, AssessmentError> {
    let raw: RawAssessment =
        serde_json::from_str(extract_json(reply)).map_err(|e| {
            AssessmentError::MalformedResponse {
                detail: format!("reply is not the expected JSON shape: {e}"),
            }
        })?;

    let risk_level =
        RiskLevel::from_str(&raw.risk_level).map_err(|_| AssessmentError::MalformedResponse {
            detail: format!("unknown risk level: {}", raw.risk_level),
        })?;

    Ok(AssessmentResult {
        risk_level,
        summary: raw.summary,
        findings: raw.findings,
        recommendations: raw.recommendations,
        raw_response: reply.to_string(),
    })
}
