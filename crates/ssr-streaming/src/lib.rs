//! Placeholder injection and response streaming for the Vue SSR bridge.
//!
//! This crate turns rendered chunks into response bytes:
//! - `Placeholder` - The fixed template markers
//! - `apply_meta_data` / `apply_renderer_meta_data` - Marker substitution
//! - `HeadMeta` - Builder for document metadata
//! - `ResponseSink` - Write-many, end-once response writer

mod head;
mod inject;
mod placeholder;
mod sink;

pub use head::*;
pub use inject::*;
pub use placeholder::*;
pub use sink::*;
