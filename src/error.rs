//! Error types for mounting and configuring the orb hero

use thiserror::Error;

/// Result type for fallible orb hero operations
pub type OrbResult<T> = Result<T, OrbError>;

/// Errors that can occur outside the (infallible) simulation step
#[derive(Error, Debug)]
pub enum OrbError {
    #[error("no global window")]
    NoWindow,

    #[error("no document on window")]
    NoDocument,

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("element is not a canvas: {0}")]
    NotACanvas(String),

    #[error("failed to register listener for '{0}'")]
    Listener(&'static str),

    #[error("GPU setup failed: {0}")]
    Gpu(String),

    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
