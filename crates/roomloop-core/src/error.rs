/// Core error types for the Roomloop engine.
use std::path::PathBuf;

/// A specialized Result type for Roomloop operations.
pub type RoomloopResult<T> = Result<T, RoomloopError>;

/// Top-level error type encompassing all Roomloop subsystems.
#[derive(Debug, thiserror::Error)]
pub enum RoomloopError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("filter graph error: {0}")]
    Graph(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl RoomloopError {
    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        RoomloopError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RoomloopError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
