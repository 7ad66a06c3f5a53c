//! Renderer factory and lifecycle controller for the Vue SSR bridge.
//!
//! This crate owns the live renderer:
//! - `RendererFactory` - Mode-specific engine options and construction
//! - `RendererController` - Rebuilds the renderer as build artifacts arrive
//! - `OutputFs` - Access to the build output (disk or in-memory)
//! - `SnapshotEngine` - Reference engine for pre-rendered bundles

mod engine;
mod factory;
mod lifecycle;
mod output;

pub use engine::*;
pub use factory::*;
pub use lifecycle::*;
pub use output::*;
