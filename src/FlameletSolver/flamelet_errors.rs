use thiserror::Error;

/// Errors raised while setting a case up. The iteration itself never fails.
#[derive(Debug, Error)]
pub enum FlameletError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Mesh mismatch: {0}")]
    MeshMismatch(String),
}
