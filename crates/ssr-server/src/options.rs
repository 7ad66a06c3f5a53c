//! App-supplied request hooks.

use std::sync::Arc;

use ssr_core::RenderContext;

/// Synchronous hook run on every context before rendering.
pub type ContextFilter = Arc<dyn Fn(&RenderContext) + Send + Sync>;

/// Per-chunk transform applied after placeholder injection.
pub type StreamWrapper = Arc<dyn Fn(String, &RenderContext) -> String + Send + Sync>;

/// Hooks that cannot live in serialized options.
#[derive(Clone, Default)]
pub struct SsrHooks {
    pub vue_context_filter: Option<ContextFilter>,
    pub stream_wrapper: Option<StreamWrapper>,
}

impl SsrHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate the render context before rendering, e.g. to add auth state
    /// or answer with a redirect.
    pub fn with_context_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RenderContext) + Send + Sync + 'static,
    {
        self.vue_context_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_stream_wrapper<F>(mut self, wrapper: F) -> Self
    where
        F: Fn(String, &RenderContext) -> String + Send + Sync + 'static,
    {
        self.stream_wrapper = Some(Arc::new(wrapper));
        self
    }

    pub(crate) fn filter(&self, ctx: &RenderContext) {
        if let Some(filter) = &self.vue_context_filter {
            filter(ctx);
        }
    }

    /// Identity without a wrapper.
    pub(crate) fn wrap(&self, chunk: String, ctx: &RenderContext) -> String {
        match &self.stream_wrapper {
            Some(wrapper) => wrapper(chunk, ctx),
            None => chunk,
        }
    }
}

impl std::fmt::Debug for SsrHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsrHooks")
            .field("vue_context_filter", &self.vue_context_filter.is_some())
            .field("stream_wrapper", &self.stream_wrapper.is_some())
            .finish()
    }
}
