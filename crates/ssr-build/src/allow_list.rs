//! Externals allow list for the server build.

use std::fmt;

use regex::Regex;
use ssr_core::SsrOptions;

use crate::error::{BuildError, BuildResult};

/// Modules matching this pattern are compiled into the server bundle;
/// everything else is loaded natively at render time.
pub const DEFAULT_EXTERNAL_ALLOW_LIST: &str = r"\.css$|\.vue$|[\\/]src[\\/]|[\\/]source[\\/]";

/// Validated allow list pattern.
#[derive(Debug, Clone)]
pub struct ExternalAllowList {
    pattern: Regex,
}

impl ExternalAllowList {
    pub fn parse(pattern: &str) -> BuildResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            BuildError::Configuration(format!("invalid external allow list: {}", e))
        })?;
        Ok(Self { pattern })
    }

    /// The configured pattern, or the default one.
    pub fn from_options(options: &SsrOptions) -> BuildResult<Self> {
        match &options.external_allow_list {
            Some(pattern) => Self::parse(pattern),
            None => Ok(Self::default()),
        }
    }

    /// Whether `module` is compiled into the bundle.
    pub fn is_bundled(&self, module: &str) -> bool {
        self.pattern.is_match(module)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for ExternalAllowList {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_EXTERNAL_ALLOW_LIST).expect("default allow list is valid"),
        }
    }
}

impl fmt::Display for ExternalAllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern.as_str())
    }
}
