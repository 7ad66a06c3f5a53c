//! HTTP surface.

use std::path::Path;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tower_http::services::ServeDir;

use crate::handler::SsrResponseHandler;

/// Catch-all router rendering every request.
pub fn ssr_router(handler: SsrResponseHandler) -> Router {
    Router::new().fallback(render).with_state(handler)
}

/// Catch-all router that first serves build output under `public_path`.
///
/// A leading `.` in the public path is dropped, so a relative `./dist/`
/// mounts at `/dist`. Files missing from the output fall through to the
/// renderer only when the mount is the root.
pub fn ssr_router_with_assets(
    handler: SsrResponseHandler,
    public_path: &str,
    output_dir: &Path,
) -> Router {
    let router = ssr_router(handler);
    match public_mount(public_path) {
        Some(mount) => router.nest_service(&mount, ServeDir::new(output_dir)),
        None => Router::new().fallback_service(ServeDir::new(output_dir).fallback(router)),
    }
}

/// Mount point for a public path, `None` for the root.
pub fn public_mount(public_path: &str) -> Option<String> {
    let path = public_path.strip_prefix('.').unwrap_or(public_path);
    let path = path.trim_matches('/');
    if path.is_empty() {
        None
    } else {
        Some(format!("/{}", path))
    }
}

async fn render(State(handler): State<SsrResponseHandler>, req: Request) -> Response {
    handler.handle(req).await
}
