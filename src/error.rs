//! Error types for the try-on tracking core.

use thiserror::Error;

/// Classified camera acquisition failures.
///
/// The calling UI renders different guidance for each variant, so camera
/// failures are never surfaced as an unclassified error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The user or platform refused camera access
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// No camera matching the constraints exists
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),

    /// Any other acquisition failure, including the first-frame timeout
    #[error("camera initialization failed: {0}")]
    InitFailure(String),
}

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Camera acquisition failed
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    /// The landmark detector rejected a configuration or a frame
    #[error("Detector error: {0}")]
    Detector(String),

    /// A tracker method was called in the wrong lifecycle state
    #[error("Invalid tracker state: {0}")]
    InvalidState(String),

    /// The scene/asset engine failed to load a model
    #[error("Model load error for {url}: {reason}")]
    ModelLoad {
        /// URL that was requested
        url: String,
        /// Failure reported by the asset engine
        reason: String,
    },

    /// Filter specification could not be parsed or is out of range
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the camera classification when this error came from camera acquisition
    #[must_use]
    pub fn camera_error(&self) -> Option<&CameraError> {
        match self {
            Self::Camera(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
