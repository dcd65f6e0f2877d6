//! Error types for ReelKit

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum RkError {
    /// No reel slot was found inside any window at settle time.
    /// Reel geometry and window geometry disagree.
    #[error("No candidate symbols inside any window ({slots} slots, {windows} windows)")]
    NoCandidates { slots: usize, windows: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RkError {
    /// Shorthand for an `InvalidConfig` error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for errors that mean the reel/window layout is broken
    pub fn is_geometry_fault(&self) -> bool {
        matches!(self, Self::NoCandidates { .. })
    }
}

/// Result type alias
pub type RkResult<T> = Result<T, RkError>;
