//! Build coordination errors.

use ssr_core::SsrError;

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while configuring or running builds.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The build process could not be started.
    #[error("failed to start {name}: {message}")]
    Spawn { name: String, message: String },

    /// The build process exited unsuccessfully.
    #[error("{name} exited with {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "a signal".into()))]
    Exited { name: String, code: Option<i32> },

    /// The extension or its options are misconfigured.
    #[error("{0}")]
    Configuration(String),

    /// The output directory could not be watched.
    #[error("failed to watch {path}: {message}")]
    Watch { path: String, message: String },
}

impl From<BuildError> for SsrError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Configuration(message) => SsrError::Configuration(message),
            other => SsrError::BuildSpawn(other.to_string()),
        }
    }
}
