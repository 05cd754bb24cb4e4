use thiserror::Error;

use crate::greenhouse::GreenhouseError;

/// Top-level error type for the analysis pipeline. Anything carrying this
/// past the per-candidate boundary aborts the run and reaches `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Greenhouse error: {0}")]
    Greenhouse(#[from] GreenhouseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
