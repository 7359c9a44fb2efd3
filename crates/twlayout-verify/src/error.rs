//! Validation error types.

use std::path::PathBuf;

use twlayout_core::LayoutError;

/// Errors that stop a validation run.
///
/// Layout disagreements are not errors: they are reported per type.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The catalog could not be laid out.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Oracle snapshot or report (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Oracle snapshot file does not exist.
    #[error("oracle snapshot not found: {}", path.display())]
    NotFound { path: PathBuf },
}

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
