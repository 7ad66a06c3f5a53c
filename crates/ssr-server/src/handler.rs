//! Per-request rendering.
//!
//! A request is answered in one of four ways:
//! - the waiting body while no renderer is built (status 200)
//! - whatever a hook set, when the context ends up with a redirect status
//! - the rendered document, buffered or streamed
//! - the fixed error body with status 500 when rendering fails
//!
//! Failures never escape the handler. Once streaming has started, a later
//! failure is appended as the final chunk and the body is ended once.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use bytes::Bytes;
use futures::channel::mpsc;
use futures::StreamExt;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use ssr_core::{
    BundleRenderer, EnvMap, EnvSource, ProcessEnv, RenderContext, RenderMode, RenderStrategy,
    RequestInfo, SsrOptions,
};
use ssr_renderer::RendererController;
use ssr_streaming::{inject_chunk, ResponseSink};
use tracing::debug;

use crate::logging::RequestLog;
use crate::options::SsrHooks;

/// Body sent while the first build is still running.
pub const WAITING_BODY: &str = "Waiting for compilation... Refresh in a moment.";

/// Body sent when rendering fails.
pub const ERROR_BODY: &str = "500 | Internal Server Error";

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Renders requests through the controller's live renderer.
#[derive(Clone)]
pub struct SsrResponseHandler {
    controller: Arc<RendererController>,
    hooks: SsrHooks,
    env: Arc<EnvMap>,
    strategy: RenderStrategy,
    mode: RenderMode,
}

impl SsrResponseHandler {
    /// Handler exposing the process environment allowed by `options`.
    pub fn new(controller: Arc<RendererController>, options: &SsrOptions, mode: RenderMode) -> Self {
        Self::with_env_source(controller, options, mode, &ProcessEnv)
    }

    pub fn with_env_source(
        controller: Arc<RendererController>,
        options: &SsrOptions,
        mode: RenderMode,
        source: &dyn EnvSource,
    ) -> Self {
        Self {
            controller,
            hooks: SsrHooks::default(),
            env: Arc::new(options.environment_variables(source)),
            strategy: options.render_strategy,
            mode,
        }
    }

    pub fn with_hooks(mut self, hooks: SsrHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_strategy(mut self, strategy: RenderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn env(&self) -> &EnvMap {
        &self.env
    }

    pub fn controller(&self) -> &Arc<RendererController> {
        &self.controller
    }

    /// Answer one request.
    pub async fn handle(&self, req: Request) -> Response {
        let (parts, _body) = req.into_parts();
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
            .to_string();

        let renderer = match self.controller.renderer() {
            Ok(renderer) => renderer,
            Err(e) => {
                debug!(%url, reason = %e, "Renderer not ready");
                return plain_response(StatusCode::OK, WAITING_BODY);
            }
        };

        let ctx = Arc::new(RenderContext::new(
            url.clone(),
            RequestInfo::from_parts(&parts),
            (*self.env).clone(),
        ));
        let log = RequestLog::new(ctx.request_id.clone(), url, self.mode);

        self.hooks.filter(&ctx);

        match self.strategy {
            RenderStrategy::Buffered => self.render_buffered(renderer, ctx, log).await,
            RenderStrategy::Stream => self.render_streamed(renderer, ctx, log).await,
        }
    }

    async fn render_buffered(
        &self,
        renderer: Arc<dyn BundleRenderer>,
        ctx: Arc<RenderContext>,
        log: RequestLog,
    ) -> Response {
        let html = match renderer.render_to_string(ctx.clone()).await {
            Ok(html) => html,
            Err(e) => {
                log.render_error(&e);
                log.finished(StatusCode::INTERNAL_SERVER_ERROR);
                return error_response();
            }
        };

        if ctx.is_redirect() {
            log.finished(ctx.status());
            return hook_response(&ctx);
        }

        let mut body = inject_chunk(&ctx, &html, self.mode);
        if let Some(after) = ctx.after_rendering() {
            after(ctx.clone()).await;
        }
        body.push_str(&ctx.take_written());

        log.finished(ctx.status());
        html_response(&ctx, Body::from(body))
    }

    async fn render_streamed(
        &self,
        renderer: Arc<dyn BundleRenderer>,
        ctx: Arc<RenderContext>,
        mut log: RequestLog,
    ) -> Response {
        let mut stream = renderer.render_to_stream(ctx.clone());

        // Headers are committed only once the first chunk is in, so early
        // failures and redirects can still pick the status.
        let first = match stream.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                log.render_error(&e);
                log.finished(StatusCode::INTERNAL_SERVER_ERROR);
                return error_response();
            }
            None => String::new(),
        };

        if ctx.is_redirect() {
            log.finished(ctx.status());
            return hook_response(&ctx);
        }

        let (tx, rx) = mpsc::channel::<Bytes>(16);
        log.mark("first_chunk");
        let response = html_response(&ctx, Body::from_stream(rx.map(Ok::<_, Infallible>)));

        let hooks = self.hooks.clone();
        let mode = self.mode;
        tokio::spawn(async move {
            let mut sink = ResponseSink::new(tx, log.timing().clone());
            let transform = |chunk: String| hooks.wrap(inject_chunk(&ctx, &chunk, mode), &ctx);

            // Every exit yields the status the duration line is logged with.
            let status = async {
                if let Err(e) = sink.write(transform(first)).await {
                    debug!(error = %e, "Client went away");
                    return ctx.status();
                }

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(chunk) => {
                            if let Err(e) = sink.write(transform(chunk)).await {
                                debug!(error = %e, "Client went away");
                                return ctx.status();
                            }
                        }
                        Err(e) => {
                            log.render_error(&e);
                            let _ = sink.fail(ERROR_BODY).await;
                            return StatusCode::INTERNAL_SERVER_ERROR;
                        }
                    }
                }

                if let Some(after) = ctx.after_rendering() {
                    after(ctx.clone()).await;
                }
                let written = ctx.take_written();
                let last = (!written.is_empty()).then(|| Bytes::from(written));
                if let Err(e) = sink.end(last).await {
                    debug!(error = %e, "Client went away");
                }
                ctx.status()
            }
            .await;

            log.finished(status);
        });

        response
    }
}

impl std::fmt::Debug for SsrResponseHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsrResponseHandler")
            .field("strategy", &self.strategy)
            .field("mode", &self.mode)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

fn plain_response(status: StatusCode, body: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}

fn error_response() -> Response {
    let mut response = plain_response(StatusCode::INTERNAL_SERVER_ERROR, ERROR_BODY);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    response
}

/// Response carrying the context's status and headers over an HTML body.
fn html_response(ctx: &RenderContext, body: Body) -> Response {
    let state = ctx.response();
    let mut response = Response::new(body);
    *response.status_mut() = state.status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    headers.extend(state.headers);
    response
}

/// Response exactly as a hook left it.
fn hook_response(ctx: &RenderContext) -> Response {
    let state = ctx.response();
    let mut response = Response::new(Body::from(state.body.concat()));
    *response.status_mut() = state.status;
    *response.headers_mut() = state.headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use futures::stream;
    use futures::FutureExt;
    use http::header::LOCATION;
    use serde_json::Value;
    use ssr_core::{ArtifactUpdate, EngineFactory, RenderError, RenderStream, RendererOptions, SsrResult};
    use ssr_renderer::RendererFactory;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Engine whose renderer replays a fixed script.
    #[derive(Clone)]
    struct ScriptedEngine {
        chunks: Vec<Result<String, RenderError>>,
    }

    struct ScriptedRenderer {
        chunks: Vec<Result<String, RenderError>>,
    }

    impl EngineFactory for ScriptedEngine {
        fn create(&self, _bundle: Value, _options: RendererOptions) -> SsrResult<Arc<dyn BundleRenderer>> {
            Ok(Arc::new(ScriptedRenderer {
                chunks: self.chunks.clone(),
            }))
        }
    }

    #[async_trait]
    impl BundleRenderer for ScriptedRenderer {
        async fn render_to_string(&self, _ctx: Arc<RenderContext>) -> Result<String, RenderError> {
            let mut html = String::new();
            for chunk in &self.chunks {
                html.push_str(chunk.as_ref().map_err(|e| e.clone())?);
            }
            Ok(html)
        }

        fn render_to_stream(&self, _ctx: Arc<RenderContext>) -> RenderStream {
            Box::pin(stream::iter(self.chunks.clone()))
        }
    }

    fn handler(chunks: Vec<Result<String, RenderError>>, strategy: RenderStrategy) -> SsrResponseHandler {
        let factory = RendererFactory::new(Arc::new(ScriptedEngine { chunks }), RenderMode::Production);
        let controller = Arc::new(RendererController::new(factory));
        controller.update(ArtifactUpdate::Template(String::new()));
        controller.update(ArtifactUpdate::Bundle(Value::Null));

        let source: HashMap<String, String> = HashMap::new();
        SsrResponseHandler::with_env_source(controller, &SsrOptions::new(), RenderMode::Production, &source)
            .with_strategy(strategy)
    }

    fn request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Log output collected by a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // === Readiness Tests ===

    #[tokio::test]
    async fn test_waiting_body_before_first_build() {
        let factory = RendererFactory::new(
            Arc::new(ScriptedEngine { chunks: vec![] }),
            RenderMode::Development,
        );
        let controller = Arc::new(RendererController::new(factory));
        let handler = SsrResponseHandler::new(controller, &SsrOptions::new(), RenderMode::Development);

        let response = handler.handle(request("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, WAITING_BODY);
    }

    // === Buffered Tests ===

    #[tokio::test]
    async fn test_buffered_success() {
        let handler = handler(vec![Ok("<html>OK</html>".into())], RenderStrategy::Buffered);

        let response = handler.handle(request("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert_eq!(body_text(response).await, "<html>OK</html>");
    }

    #[tokio::test]
    async fn test_buffered_failure() {
        let handler = handler(
            vec![Err(RenderError::Engine("boom".into()))],
            RenderStrategy::Buffered,
        );

        let response = handler.handle(request("/")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, ERROR_BODY);
    }

    #[tokio::test]
    async fn test_redirect_returns_hook_response() {
        let handler = handler(vec![Ok("<html>page</html>".into())], RenderStrategy::Buffered)
            .with_hooks(SsrHooks::new().with_context_filter(|ctx| {
                ctx.set_status(StatusCode::FOUND);
                ctx.set_header(LOCATION, HeaderValue::from_static("/login"));
            }));

        let response = handler.handle(request("/account")).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_after_render_output_is_appended() {
        let handler = handler(vec![Ok("<html></html>".into())], RenderStrategy::Buffered)
            .with_hooks(SsrHooks::new().with_context_filter(|ctx| {
                ctx.set_after_rendering(Arc::new(|ctx: Arc<RenderContext>| {
                    async move { ctx.write("<!-- done -->") }.boxed()
                }));
            }));

        let response = handler.handle(request("/")).await;

        assert_eq!(body_text(response).await, "<html></html><!-- done -->");
    }

    // === Streamed Tests ===

    #[tokio::test]
    async fn test_stream_wrapper_applies_to_every_chunk() {
        let handler = handler(
            vec![Ok("a".into()), Ok("b".into()), Ok("c".into())],
            RenderStrategy::Stream,
        )
        .with_hooks(SsrHooks::new().with_stream_wrapper(|chunk, _| format!("[{chunk}]")));

        let response = handler.handle(request("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "[a][b][c]");
    }

    #[tokio::test]
    async fn test_stream_error_after_first_chunk() {
        let handler = handler(
            vec![
                Ok("<html>".into()),
                Err(RenderError::Stream("socket".into())),
                Ok("never".into()),
            ],
            RenderStrategy::Stream,
        );

        let response = handler.handle(request("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert_eq!(body, format!("<html>{}", ERROR_BODY));
        assert_eq!(body.matches(ERROR_BODY).count(), 1);
    }

    #[tokio::test]
    async fn test_stream_error_before_first_chunk() {
        let handler = handler(
            vec![Err(RenderError::Engine("boom".into()))],
            RenderStrategy::Stream,
        );

        let response = handler.handle(request("/")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, ERROR_BODY);
    }

    #[tokio::test]
    async fn test_stream_redirect_returns_hook_response() {
        let handler = handler(
            vec![Ok("<html>page</html>".into()), Ok("tail".into())],
            RenderStrategy::Stream,
        )
        .with_hooks(SsrHooks::new().with_context_filter(|ctx| {
            ctx.set_status(StatusCode::FOUND);
            ctx.set_header(LOCATION, HeaderValue::from_static("/login"));
        }));

        let response = handler.handle(request("/account")).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        let body = body_text(response).await;
        assert!(!body.contains("page"));
        assert!(!body.contains("tail"));
    }

    #[tokio::test]
    async fn test_duration_logged_when_client_disconnects() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let handler = handler(
            vec![Ok("<html>".into()), Ok("<body>".into()), Ok("</html>".into())],
            RenderStrategy::Stream,
        );
        let response = handler.handle(request("/gone")).await;
        drop(response);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !logs.text().contains("Request duration") {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("duration line not logged");

        assert!(logs.text().contains("/gone"));
    }

    #[tokio::test]
    async fn test_env_script_injected_when_marker_present() {
        let handler = handler(
            vec![Ok("<head><!--vue-head-outlet--></head>".into())],
            RenderStrategy::Stream,
        );

        let body = body_text(handler.handle(request("/")).await).await;

        assert!(body.contains("window.VUE_ENV = {};"));
    }
}
