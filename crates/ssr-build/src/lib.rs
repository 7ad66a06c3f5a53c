//! Dual-build coordination for the Vue SSR bridge.
//!
//! The client build produces the template and the client manifest; a second,
//! server-targeted build produces the server bundle. This crate derives the
//! server build from the app definition, runs it as a child process, and
//! forwards the bundles it reports.
//!
//! - `AppDefinition` / `derive_server_app` - Server build derivation
//! - `WorkerMessage` - Line protocol spoken by the server build
//! - `BuildCoordinator` - Spawns builds and forwards bundles
//! - `OutputWatcher` - Build-finished notifications from the output directory
//! - `ExternalAllowList` - Dependencies compiled into the server bundle
//! - `VueExtension` - Scope check and spawn gating

mod allow_list;
mod app;
mod coordinator;
mod error;
mod extension;
mod flag;
mod message;
mod watch;

pub use allow_list::*;
pub use app::*;
pub use coordinator::*;
pub use error::*;
pub use extension::*;
pub use flag::*;
pub use message::*;
pub use watch::*;
