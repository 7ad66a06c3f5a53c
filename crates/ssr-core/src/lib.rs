//! Core abstractions for the Vue server-side rendering bridge.
//!
//! This crate provides the fundamental types and traits:
//! - `SsrOptions` / `RenderMode` - Plugin configuration
//! - `resolve_env_vars` - Public environment variable resolution
//! - `RenderContext` - Per-request render state shared with the engine
//! - `BundleRenderer` / `EngineFactory` - The render engine contract
//! - `ServerBundle` / `ClientManifest` - Build artifacts
//! - `SsrError` - Error taxonomy

mod artifacts;
mod config;
mod context;
mod env;
mod error;
mod lifecycle;
mod meta;
mod renderer;

pub use artifacts::*;
pub use config::*;
pub use context::*;
pub use env::*;
pub use error::*;
pub use lifecycle::*;
pub use meta::*;
pub use renderer::*;
