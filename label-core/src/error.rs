//! Error types for designer operations.

use thiserror::Error;

/// Result type for designer operations.
pub type DesignerResult<T> = Result<T, DesignerError>;

/// Errors that can occur in designer operations.
///
/// Geometry constraint violations are never reported here: they are
/// clamped by the transform controller.
#[derive(Debug, Error)]
pub enum DesignerError {
    /// Element not found in the layout.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Layout document parsed but violates the geometry model.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The external rendering service failed.
    #[error("Rendering error: {0}")]
    Render(String),
}
