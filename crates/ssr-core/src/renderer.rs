//! Render engine contract.
//!
//! The engine that turns a server bundle into HTML is external to the
//! bridge. It is reached through [`EngineFactory`], which builds an
//! immutable [`BundleRenderer`] from a bundle and [`RendererOptions`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::artifacts::ClientManifest;
use crate::context::RenderContext;
use crate::error::SsrResult;

/// Failure reported by the render engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The engine rejected the render call.
    #[error("{0}")]
    Engine(String),

    /// The chunk stream failed after it started.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Successive document chunks, terminated by completion or an error.
pub type RenderStream = BoxStream<'static, Result<String, RenderError>>;

/// A built renderer.
///
/// Instances are immutable once created; a rebuild produces a new one.
#[async_trait]
pub trait BundleRenderer: Send + Sync {
    /// Render the complete document.
    async fn render_to_string(&self, ctx: Arc<RenderContext>) -> Result<String, RenderError>;

    /// Render the document as a chunk stream.
    fn render_to_stream(&self, ctx: Arc<RenderContext>) -> RenderStream;
}

/// Builds renderers from server bundles.
pub trait EngineFactory: Send + Sync {
    /// Create a renderer. A bundle the engine cannot load is an error.
    fn create(&self, bundle: Value, options: RendererOptions) -> SsrResult<Arc<dyn BundleRenderer>>;
}

/// How often the engine re-evaluates the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunInNewContext {
    /// Fresh global context for every render.
    Always,
    /// Evaluate once and share the context across renders.
    Once,
}

/// Result cache the engine is wired with.
pub trait RenderCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Options passed to the engine factory.
#[derive(Clone)]
pub struct RendererOptions {
    pub run_in_new_context: RunInNewContext,
    /// HTML template the app is rendered into.
    pub template: String,
    pub client_manifest: Option<ClientManifest>,
    /// Let the engine inject styles and scripts into the template.
    pub inject: bool,
    pub cache: Option<Arc<dyn RenderCache>>,
}

impl RendererOptions {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            run_in_new_context: RunInNewContext::Once,
            template: template.into(),
            client_manifest: None,
            inject: true,
            cache: None,
        }
    }

    pub fn with_run_in_new_context(mut self, mode: RunInNewContext) -> Self {
        self.run_in_new_context = mode;
        self
    }

    pub fn with_client_manifest(mut self, manifest: Option<ClientManifest>) -> Self {
        self.client_manifest = manifest;
        self
    }

    pub fn with_inject(mut self, inject: bool) -> Self {
        self.inject = inject;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn RenderCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl fmt::Debug for RendererOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererOptions")
            .field("run_in_new_context", &self.run_in_new_context)
            .field("template_len", &self.template.len())
            .field("client_manifest", &self.client_manifest.is_some())
            .field("inject", &self.inject)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = RendererOptions::new("<html></html>");

        assert_eq!(options.run_in_new_context, RunInNewContext::Once);
        assert!(options.inject);
        assert!(options.cache.is_none());
        assert!(options.client_manifest.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = RendererOptions::new("")
            .with_run_in_new_context(RunInNewContext::Always)
            .with_inject(false)
            .with_client_manifest(Some(ClientManifest::default()));

        assert_eq!(options.run_in_new_context, RunInNewContext::Always);
        assert!(!options.inject);
        assert!(options.client_manifest.is_some());
    }

    #[test]
    fn test_render_error_display() {
        assert_eq!(RenderError::Engine("boom".into()).to_string(), "boom");
        assert_eq!(
            RenderError::Stream("closed".into()).to_string(),
            "Stream error: closed"
        );
    }
}
