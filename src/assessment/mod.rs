pub mod types;
pub mod prompt;
pub mod parser;
pub mod gemini;
pub mod service;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use gemini::*;
pub use service::*;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from the assessment pipeline.
///
/// `Unavailable` and `MalformedResponse` display the same patient-facing
/// sentence; the variants stay distinct so logs can tell a dead endpoint
/// from a reply that failed schema validation.
#[derive(Error, Debug)]
pub enum AssessmentError {
    /// Transport or endpoint failure: connect, send, non-2xx, empty reply.
    #[error("Failed to analyze patient data. Please try again.")]
    Unavailable { reason: String },

    /// The endpoint answered, but the reply failed strict schema validation.
    #[error("Failed to analyze patient data. Please try again.")]
    MalformedResponse { detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
