//! CLI command implementations.

pub mod check;
pub mod serve;

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;
use ssr_core::{RenderMode, RenderStrategy};

use crate::context::Context;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Run next to watching builds instead of persisted output.
    #[arg(long)]
    pub dev: bool,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Render strategy (stream or buffered).
    #[arg(long)]
    pub strategy: Option<RenderStrategy>,
}

impl ServeArgs {
    /// `--dev` wins; otherwise `NODE_ENV` decides.
    pub fn mode(&self) -> RenderMode {
        if self.dev {
            RenderMode::Development
        } else {
            RenderMode::from_env()
        }
    }

    /// Listener address, flags over config.
    pub fn addr(&self, ctx: &Context) -> Result<SocketAddr> {
        let host = self.host.as_deref().unwrap_or(&ctx.config.server.host);
        let port = self.port.unwrap_or(ctx.config.server.port);
        format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", host, port))
    }

    /// Render strategy, flag over config.
    pub fn strategy(&self, ctx: &Context) -> RenderStrategy {
        self.strategy.unwrap_or(ctx.config.ssr.render_strategy)
    }
}

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output directory to check instead of the configured one.
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use crate::output::Output;
    use std::path::PathBuf;

    fn context() -> Context {
        Context {
            config: CliConfig::default(),
            output: Output::new(false, true),
            cwd: PathBuf::from("/srv/app"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let args = ServeArgs {
            dev: true,
            port: Some(8080),
            host: None,
            strategy: Some(RenderStrategy::Buffered),
        };
        let ctx = context();

        assert_eq!(args.mode(), RenderMode::Development);
        assert_eq!(args.addr(&ctx).unwrap(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(args.strategy(&ctx), RenderStrategy::Buffered);
    }

    #[test]
    fn test_config_fallbacks() {
        let args = ServeArgs {
            dev: false,
            port: None,
            host: Some("0.0.0.0".into()),
            strategy: None,
        };
        let ctx = context();

        assert_eq!(args.addr(&ctx).unwrap(), "0.0.0.0:3000".parse().unwrap());
        assert_eq!(args.strategy(&ctx), RenderStrategy::Stream);
    }

    #[test]
    fn test_invalid_host() {
        let args = ServeArgs {
            dev: false,
            port: None,
            host: Some("not a host".into()),
            strategy: None,
        };

        assert!(args.addr(&context()).is_err());
    }
}
