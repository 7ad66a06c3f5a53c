//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ssr_build::AppDefinition;
use ssr_core::SsrOptions;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Options handed to the bridge.
    #[serde(default)]
    pub ssr: SsrOptions,

    /// Build commands and output locations.
    #[serde(default)]
    pub build: BuildConfig,

    /// The app being rendered.
    #[serde(default)]
    pub app: AppDefinition,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding the template, client manifest and server bundle.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path the output directory is served under.
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Command running the server build (development only).
    #[serde(default)]
    pub server_command: Option<String>,

    /// Command running the client build (development only).
    #[serde(default)]
    pub client_command: Option<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_public_path() -> String {
    "/".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            public_path: default_public_path(),
            server_command: None,
            client_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ssr_core::RenderStrategy;

    #[test]
    fn test_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.build.output_dir, PathBuf::from("dist"));
        assert_eq!(config.build.public_path, "/");
        assert_eq!(config.ssr.render_strategy, RenderStrategy::Stream);
        assert!(config.build.server_command.is_none());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ssr.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[ssr]
env_vars = ["API_URL"]
render_strategy = "buffered"

[ssr.additional_env_vars]
BUILD = 42

[build]
output_dir = "public/build"
public_path = "./build/"
server_command = "npm run build:server"

[app]
id = 3
appName = "Shop"
useSsr = true
entry = "./src/main.ts"
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ssr.env_vars, vec!["API_URL"]);
        assert_eq!(config.ssr.render_strategy, RenderStrategy::Buffered);
        assert_eq!(config.build.output_dir, PathBuf::from("public/build"));
        assert_eq!(config.build.server_command.as_deref(), Some("npm run build:server"));
        assert_eq!(config.app.id, 3);
        assert_eq!(config.app.app_name, "Shop");
        assert!(config.app.use_ssr);
        assert_eq!(config.app.extra["entry"], "./src/main.ts");
    }

    #[test]
    fn test_load_json_with_camel_case_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ssr.json");
        std::fs::write(
            &path,
            r#"{"ssr": {"envVars": ["API_URL"], "externalAllowList": "\\.vue$"}}"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();

        assert_eq!(config.ssr.env_vars, vec!["API_URL"]);
        assert_eq!(config.ssr.external_allow_list.as_deref(), Some("\\.vue$"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ssr.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"").unwrap();

        let err = CliConfig::load(&path).unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to parse TOML config"));
    }
}
