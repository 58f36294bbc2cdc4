//! Error types for provisioning operations.
//!
//! There is deliberately one failure taxonomy here: an external step that
//! exits non-zero (or cannot be started) is fatal to the whole run. An
//! unrecognized framework path is never an error anywhere in this crate.

use thiserror::Error;

/// Errors that can occur while running provisioning steps.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// An external step exited with a non-zero status. The code is the
    /// child's exit code, propagated unchanged.
    #[error("Step '{step}' failed with exit code {code}")]
    StepFailed { step: String, code: i32 },

    /// An external step was killed by a signal before producing an exit code.
    #[error("Step '{step}' terminated by signal")]
    StepKilled { step: String },

    /// An external step could not be spawned at all.
    #[error("Failed to start step '{step}': {source}")]
    Spawn {
        step: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
