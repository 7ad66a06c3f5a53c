//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, in lookup order.
const CONFIG_NAMES: [&str; 3] = ["ssr.toml", ".ssr.toml", "ssr.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = match config_path {
            Some(path) => CliConfig::load(Path::new(path))?,
            None => match find_config(&cwd) {
                Some(path) => {
                    output.debug(&format!("Using config {}", path.display()));
                    CliConfig::load(&path)?
                }
                None => CliConfig::default(),
            },
        };

        Ok(Self { config, output, cwd })
    }

    /// The build output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.build.output_dir)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in `start` or one of its parents.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("packages").join("web");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".ssr.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.path().join(".ssr.toml")));
    }

    #[test]
    fn test_find_config_prefers_closest_and_first_name() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("web");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("ssr.toml"), "").unwrap();
        std::fs::write(nested.join("ssr.json"), "{}").unwrap();
        std::fs::write(nested.join("ssr.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(nested.join("ssr.toml")));
    }

    #[test]
    fn test_resolve_path() {
        let ctx = Context {
            config: CliConfig::default(),
            output: Output::new(false, true),
            cwd: PathBuf::from("/srv/app"),
        };

        assert_eq!(ctx.output_dir(), PathBuf::from("/srv/app/dist"));
        assert_eq!(ctx.resolve_path(Path::new("/tmp/out")), PathBuf::from("/tmp/out"));
    }
}
