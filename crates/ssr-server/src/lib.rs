//! Request handling and HTTP surface for the Vue SSR bridge.
//!
//! - `SsrResponseHandler` - Renders one request, buffered or streamed
//! - `SsrHooks` - Context filter and stream wrapper supplied by the app
//! - `RequestLog` - Per-request duration and failure logging
//! - `ssr_router` - Catch-all axum router, optionally serving build assets

mod handler;
mod logging;
mod options;
mod router;

pub use handler::*;
pub use logging::*;
pub use options::*;
pub use router::*;
