//! Renderer construction per render mode.

use std::sync::Arc;

use serde_json::Value;
use ssr_cache::MokaRenderCache;
use ssr_core::{
    BundleRenderer, ClientManifest, EngineFactory, RenderMode, RendererOptions, RunInNewContext,
    SsrError, SsrResult,
};

/// Engine options for a render mode.
///
/// Development re-evaluates the bundle on every render, leaves injection to
/// the request handler and renders uncached. Production shares one context,
/// lets the engine inject assets and caches results.
pub fn renderer_options(
    template: impl Into<String>,
    client_manifest: Option<ClientManifest>,
    mode: RenderMode,
) -> SsrResult<RendererOptions> {
    let options = RendererOptions::new(template).with_client_manifest(client_manifest);

    let options = match mode {
        RenderMode::Development => options
            .with_run_in_new_context(RunInNewContext::Always)
            .with_inject(false),
        RenderMode::Production => options
            .with_run_in_new_context(RunInNewContext::Once)
            .with_inject(true),
    };

    match MokaRenderCache::for_mode(mode).map_err(|e| SsrError::Configuration(e.to_string()))? {
        Some(cache) => Ok(options.with_cache(cache)),
        None => Ok(options),
    }
}

/// Builds renderers through an engine, with options chosen by mode.
#[derive(Clone)]
pub struct RendererFactory {
    engine: Arc<dyn EngineFactory>,
    mode: RenderMode,
}

impl RendererFactory {
    pub fn new(engine: Arc<dyn EngineFactory>, mode: RenderMode) -> Self {
        Self { engine, mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Build a renderer from a bundle and template.
    pub fn create(
        &self,
        bundle: Value,
        template: &str,
        client_manifest: Option<ClientManifest>,
    ) -> SsrResult<Arc<dyn BundleRenderer>> {
        let options = renderer_options(template, client_manifest, self.mode)?;
        self.engine.create(bundle, options)
    }
}

impl std::fmt::Debug for RendererFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererFactory")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
