//! Error types for claimvec

use thiserror::Error;

/// Errors that can occur while loading a bundle or vectorizing records
#[derive(Debug, Error)]
pub enum VectorizeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot read bundle artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Preprocessing mismatch: {offending} of {total} vector entries are non-finite or exceed \
         magnitude {threshold}; verify the label encoders and scaler match the input schema"
    )]
    Mismatch {
        offending: usize,
        total: usize,
        threshold: f64,
    },
}
