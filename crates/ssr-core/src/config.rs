//! Plugin configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::env::{resolve_env_vars, EnvMap, EnvSource, EnvValue};

/// Whether the bridge runs next to a watching build or from persisted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Development,
    #[default]
    Production,
}

impl RenderMode {
    /// Derive the mode from `NODE_ENV`.
    pub fn from_env() -> Self {
        Self::from_node_env(std::env::var("NODE_ENV").ok().as_deref())
    }

    /// Only the literal `development` selects development mode.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("development") => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// How the request handler drives the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStrategy {
    /// Write chunks as the engine yields them.
    #[default]
    Stream,
    /// Render the whole document, then write it once.
    Buffered,
}

impl std::str::FromStr for RenderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stream" => Ok(Self::Stream),
            "buffered" => Ok(Self::Buffered),
            other => Err(format!("unknown render strategy: {other}")),
        }
    }
}

/// Serializable SSR options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SsrOptions {
    /// Environment variables made public to the app and the browser.
    #[serde(default, alias = "envVars")]
    pub env_vars: Vec<String>,

    /// Static values merged over the resolved variables.
    #[serde(default, alias = "additionalEnvVars")]
    pub additional_env_vars: BTreeMap<String, EnvValue>,

    /// Regex source deciding which dependencies are compiled into the
    /// server bundle instead of being loaded natively.
    #[serde(default, alias = "externalAllowList", skip_serializing_if = "Option::is_none")]
    pub external_allow_list: Option<String>,

    /// Streamed or buffered rendering.
    #[serde(default, alias = "renderStrategy")]
    pub render_strategy: RenderStrategy,
}

impl SsrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose an environment variable.
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_vars.push(name.into());
        self
    }

    /// Add a static variable.
    pub fn with_additional_env_var(
        mut self,
        name: impl Into<String>,
        value: impl Into<EnvValue>,
    ) -> Self {
        self.additional_env_vars.insert(name.into(), value.into());
        self
    }

    /// Set the externals allow list pattern.
    pub fn with_external_allow_list(mut self, pattern: impl Into<String>) -> Self {
        self.external_allow_list = Some(pattern.into());
        self
    }

    /// Set the render strategy.
    pub fn with_strategy(mut self, strategy: RenderStrategy) -> Self {
        self.render_strategy = strategy;
        self
    }

    /// Resolve the public variables against `source`.
    pub fn environment_variables(&self, source: &dyn EnvSource) -> EnvMap {
        resolve_env_vars(&self.env_vars, source, &self.additional_env_vars)
    }
}
