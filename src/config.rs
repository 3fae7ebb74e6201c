use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Myeloma Guard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the required AI endpoint credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Optional override for the AI endpoint base URL.
pub const API_BASE_VAR: &str = "MYELOMA_GUARD_API_BASE";
/// Optional override for the generation model id.
pub const MODEL_VAR: &str = "MYELOMA_GUARD_MODEL";

/// Default base URL of the hosted generation endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default generation model. Vision-capable; interprets attached scans.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Errors from configuration lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key configured. Set the {API_KEY_VAR} environment variable.")]
    MissingApiKey,
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "myeloma_guard=info"
}

/// The required AI endpoint credential.
///
/// The single piece of environment-driven configuration the workflow
/// cannot run without.
pub fn api_key() -> Result<String, ConfigError> {
    env_nonempty(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)
}

/// AI endpoint base URL, with optional environment override.
pub fn api_base() -> String {
    env_nonempty(API_BASE_VAR).unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Generation model id, with optional environment override.
pub fn model_id() -> String {
    env_nonempty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Get the application data directory
/// ~/MyelomaGuard/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MyelomaGuard")
}

/// Get the directory exported reports are written to by default
pub fn default_export_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Read an environment variable, treating empty values as unset.
fn env_nonempty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
