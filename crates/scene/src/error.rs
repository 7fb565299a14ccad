//! Scene error types

use thiserror::Error;

/// Scene errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// The scene was disposed and cannot be reused
    #[error("Scene has been disposed")]
    Disposed,

    /// The scene factory failed to build a scene
    #[error("Scene construction failed: {0}")]
    Construction(String),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
