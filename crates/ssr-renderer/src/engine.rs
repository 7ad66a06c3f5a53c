//! Reference render engine.
//!
//! `SnapshotEngine` renders bundles whose files hold pre-rendered app
//! markup. Each file is keyed by route path; the entry file answers every
//! route without its own snapshot. It honors the full engine contract
//! (options, cache, capabilities, streaming) and is what the CLI serves
//! when no other engine is plugged in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use ssr_cache::RenderCacheKey;
use ssr_core::{
    BundleRenderer, ClientManifest, EngineFactory, RenderContext, RenderError, RenderStream,
    RendererOptions, RunInNewContext, ServerBundle, SsrError, SsrResult,
};
use ssr_streaming::APP_OUTLET;

/// Factory for [`SnapshotRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotEngine;

impl EngineFactory for SnapshotEngine {
    fn create(
        &self,
        bundle: serde_json::Value,
        options: RendererOptions,
    ) -> SsrResult<Arc<dyn BundleRenderer>> {
        Ok(Arc::new(SnapshotRenderer::new(bundle, options)?))
    }
}

/// Renderer over a pre-rendered bundle.
pub struct SnapshotRenderer {
    bundle: ServerBundle,
    head: String,
    tail: String,
    options: RendererOptions,
    evaluations: AtomicU64,
}

impl SnapshotRenderer {
    pub fn new(bundle: serde_json::Value, options: RendererOptions) -> SsrResult<Self> {
        let bundle = ServerBundle::from_value(bundle)?;

        let Some((head, tail)) = options.template.split_once(APP_OUTLET) else {
            return Err(SsrError::Configuration(format!(
                "template is missing the {} outlet",
                APP_OUTLET
            )));
        };
        let (head, tail) = (head.to_string(), tail.to_string());

        // A shared context is evaluated once, up front.
        let evaluations = match options.run_in_new_context {
            RunInNewContext::Once => 1,
            RunInNewContext::Always => 0,
        };

        Ok(Self {
            bundle,
            head,
            tail,
            options,
            evaluations: AtomicU64::new(evaluations),
        })
    }

    /// Number of bundle evaluations so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn render_app(&self, ctx: &RenderContext) -> String {
        if self.options.run_in_new_context == RunInNewContext::Always {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
        }

        let key = RenderCacheKey::for_url(&ctx.url);
        if let Some(cached) = self.options.cache.as_ref().and_then(|c| c.get(key.as_str())) {
            return cached;
        }

        let markup = self
            .bundle
            .file(ctx.path())
            .or_else(|| self.bundle.entry_source())
            .unwrap_or_default()
            .to_string();

        if let Some(cache) = &self.options.cache {
            cache.set(key.as_str(), markup.clone());
        }
        markup
    }

    /// Register the script and state fragments on the context.
    fn register_capabilities(&self, ctx: &RenderContext) {
        let scripts = self
            .options
            .client_manifest
            .as_ref()
            .map(script_tags)
            .unwrap_or_default();
        ctx.set_render_scripts(Arc::new(move || scripts.clone()));

        let state = state_script(ctx);
        ctx.set_render_state(Arc::new(move || state.clone()));
    }

    fn document_parts(&self, ctx: &RenderContext) -> (String, String) {
        let manifest = match (&self.options.client_manifest, self.options.inject) {
            (Some(manifest), true) => manifest,
            _ => return (self.head.clone(), self.tail.clone()),
        };

        let head = insert_before(&self.head, "</head>", &resource_hints(manifest));
        let body_end = format!(
            "{}{}",
            ctx.render_state().unwrap_or_default(),
            ctx.render_scripts().unwrap_or_default()
        );
        let tail = insert_before(&self.tail, "</body>", &body_end);
        (head, tail)
    }
}

#[async_trait]
impl BundleRenderer for SnapshotRenderer {
    async fn render_to_string(&self, ctx: Arc<RenderContext>) -> Result<String, RenderError> {
        self.register_capabilities(&ctx);
        let app = self.render_app(&ctx);
        let (head, tail) = self.document_parts(&ctx);
        Ok(format!("{}{}{}", head, app, tail))
    }

    fn render_to_stream(&self, ctx: Arc<RenderContext>) -> RenderStream {
        self.register_capabilities(&ctx);
        let app = self.render_app(&ctx);
        let (head, tail) = self.document_parts(&ctx);
        let chunks: [Result<String, RenderError>; 3] = [Ok(head), Ok(app), Ok(tail)];
        Box::pin(stream::iter(chunks))
    }
}

impl std::fmt::Debug for SnapshotRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRenderer")
            .field("entry", &self.bundle.entry)
            .field("files", &self.bundle.files.len())
            .field("options", &self.options)
            .finish()
    }
}

fn script_tags(manifest: &ClientManifest) -> String {
    manifest
        .initial_scripts()
        .map(|file| format!(r#"<script src="{}" defer></script>"#, manifest.asset_url(file)))
        .collect()
}

fn resource_hints(manifest: &ClientManifest) -> String {
    let preloads = manifest.initial_scripts().map(|file| {
        format!(
            r#"<link rel="preload" href="{}" as="script">"#,
            manifest.asset_url(file)
        )
    });
    let styles = manifest.initial_styles().map(|file| {
        format!(r#"<link rel="stylesheet" href="{}">"#, manifest.asset_url(file))
    });
    preloads.chain(styles).collect()
}

fn state_script(ctx: &RenderContext) -> String {
    let state = serde_json::Value::Object(ctx.state()).to_string();
    format!(
        "<script>window.__INITIAL_STATE__={}</script>",
        state.replace("</", "<\\/")
    )
}

fn insert_before(text: &str, marker: &str, insert: &str) -> String {
    match text.rfind(marker) {
        Some(idx) => format!("{}{}{}", &text[..idx], insert, &text[idx..]),
        None => format!("{}{}", text, insert),
    }
}
