//! Public SDK for the Vue SSR bridge.
//!
//! This crate re-exports the whole bridge:
//!
//! ```ignore
//! use ssr_sdk::prelude::*;
//!
//! let mode = RenderMode::from_env();
//! let factory = RendererFactory::new(Arc::new(SnapshotEngine), mode);
//! let controller = Arc::new(RendererController::production(factory, &DiskOutput, dir)?);
//!
//! let hooks = SsrHooks::new().with_context_filter(|ctx| {
//!     ctx.set_meta(Arc::new(HeadMeta::new("Shop")));
//! });
//! let handler = SsrResponseHandler::new(controller, &options, mode).with_hooks(hooks);
//! axum::serve(listener, ssr_router(handler)).await?;
//! ```

pub use ssr_build;
pub use ssr_cache;
pub use ssr_core;
pub use ssr_renderer;
pub use ssr_server;
pub use ssr_streaming;

/// Prelude for convenient imports.
pub mod prelude {
    pub use ssr_build::*;
    pub use ssr_cache::*;
    pub use ssr_core::*;
    pub use ssr_renderer::*;
    pub use ssr_server::*;
    pub use ssr_streaming::*;
}
