//! Error types for the SSR bridge.

use std::path::PathBuf;

use crate::renderer::RenderError;

/// Result alias used across the bridge crates.
pub type SsrResult<T> = Result<T, SsrError>;

/// Errors that can occur in the SSR pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SsrError {
    /// No renderer has been built yet.
    #[error("The renderer instance was not instantiated yet")]
    NotReady,

    /// The render engine failed while rendering.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// A build artifact could not be read.
    #[error("Failed to read build artifact {}: {source}", .path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A build artifact is not valid JSON.
    #[error("Failed to parse build artifact {}: {source}", .path.display())]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The server bundle was rejected by the engine.
    #[error("Invalid server bundle: {0}")]
    InvalidBundle(String),

    /// The secondary server build could not be started or failed.
    #[error("Server build failed: {0}")]
    BuildSpawn(String),

    /// The plugin was configured in an unsupported way.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SsrError {
    /// Whether this error should stop the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NotReady | Self::Render(_))
    }
}
