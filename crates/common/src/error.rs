//! Error types shared across Trackcut crates.

/// Top-level error type for Trackcut operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackcutError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Upload error: {message}")]
    Upload { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using TrackcutError.
pub type TrackcutResult<T> = Result<T, TrackcutError>;

impl TrackcutError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this failure came from talking to an external collaborator
    /// (upload, render, preview). Such failures leave the model untouched.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Render { .. } | Self::Upload { .. }
        )
    }
}
