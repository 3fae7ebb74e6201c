//! Myeloma Guard — AI-assisted intake and risk screening for multiple
//! myeloma.
//!
//! The crate drives one intake case end to end: capture the patient record
//! and diagnostic images, validate, confirm, submit to the generative
//! endpoint, and export the resulting report. [`workflow::IntakeWorkflow`]
//! is the entry point; the remaining modules are its parts.

pub mod config;
pub mod models; // patient record, clinical enums, history/symptoms/labs
pub mod validation;
pub mod imaging; // diagnostic image capture + per-modality notes
pub mod assessment; // prompt assembly, generation client, reply parsing
pub mod workflow; // the Intake → Analyzing → Report state machine
pub mod export; // PDF + CSV report artifacts

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedders that do not install their own
/// subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
