//! Render-result caching for the Vue SSR bridge.
//!
//! This crate provides:
//! - `RenderCachePolicy` - Entry bound and TTL per render mode
//! - `MokaRenderCache` - LRU + TTL cache the render engine is wired with
//! - `RenderCacheKey` - Normalized cache keys for rendered URLs
//!
//! # Example
//!
//! ```ignore
//! use ssr_cache::{MokaRenderCache, RenderCachePolicy};
//!
//! let cache = MokaRenderCache::new(RenderCachePolicy::production())?;
//! ```

mod cache;
mod key;
mod policy;

pub use cache::*;
pub use key::*;
pub use policy::*;
