//! Per-request render context.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use parking_lot::Mutex;
use serde_json::Value;

use crate::env::EnvMap;
use crate::meta::DocumentMeta;

/// Status codes a context hook answers by itself.
pub const REDIRECT_STATUSES: [StatusCode; 3] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::TEMPORARY_REDIRECT,
];

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parts of the incoming request the app may inspect.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }

    /// Get a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response state hooks may mutate before and during rendering.
#[derive(Debug, Clone)]
pub struct ResponseState {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Text written by hooks, in order.
    pub body: Vec<String>,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

/// Async hook awaited once rendering finished.
pub type AfterRenderHook = Arc<dyn Fn(Arc<RenderContext>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Lazily rendered HTML fragment provided by the engine.
pub type FragmentFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Optional capabilities, checked by presence.
#[derive(Clone, Default)]
struct Capabilities {
    meta: Option<Arc<dyn DocumentMeta>>,
    render_scripts: Option<FragmentFn>,
    render_state: Option<FragmentFn>,
    after_rendering: Option<AfterRenderHook>,
}

/// Render context created for every request.
///
/// Shared between the request handler and the render engine; the mutable
/// parts are guarded so the engine can fill them in while the handler
/// reads them for each chunk.
pub struct RenderContext {
    /// Request URL (path and query).
    pub url: String,
    pub request: RequestInfo,
    /// Resolved public environment variables.
    pub env: EnvMap,
    pub request_id: RequestId,
    response: Mutex<ResponseState>,
    capabilities: Mutex<Capabilities>,
    state: Mutex<serde_json::Map<String, Value>>,
}

impl RenderContext {
    pub fn new(url: impl Into<String>, request: RequestInfo, env: EnvMap) -> Self {
        Self {
            url: url.into(),
            request,
            env,
            request_id: RequestId::generate(),
            response: Mutex::new(ResponseState::default()),
            capabilities: Mutex::new(Capabilities::default()),
            state: Mutex::new(serde_json::Map::new()),
        }
    }

    /// Context for a plain GET of `url`.
    pub fn for_url(url: impl Into<String>, env: EnvMap) -> Self {
        let url = url.into();
        let request = RequestInfo {
            uri: url.parse().unwrap_or_default(),
            ..Default::default()
        };
        Self::new(url, request, env)
    }

    /// Request path without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("/")
    }

    // --- response ---

    pub fn status(&self) -> StatusCode {
        self.response.lock().status
    }

    pub fn set_status(&self, status: StatusCode) {
        self.response.lock().status = status;
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.response.lock().headers.insert(name, value);
    }

    /// Append text to the response body.
    pub fn write(&self, text: impl Into<String>) {
        self.response.lock().body.push(text.into());
    }

    /// Whether a hook answered with a redirect.
    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUSES.contains(&self.status())
    }

    /// Copy of the current response state.
    pub fn response(&self) -> ResponseState {
        self.response.lock().clone()
    }

    /// Remove and return the text written so far.
    pub fn take_written(&self) -> String {
        std::mem::take(&mut self.response.lock().body).concat()
    }

    // --- capabilities ---

    pub fn set_meta(&self, meta: Arc<dyn DocumentMeta>) {
        self.capabilities.lock().meta = Some(meta);
    }

    pub fn meta(&self) -> Option<Arc<dyn DocumentMeta>> {
        self.capabilities.lock().meta.clone()
    }

    pub fn set_render_scripts(&self, f: FragmentFn) {
        self.capabilities.lock().render_scripts = Some(f);
    }

    pub fn render_scripts(&self) -> Option<String> {
        let f = self.capabilities.lock().render_scripts.clone();
        f.map(|f| f())
    }

    pub fn set_render_state(&self, f: FragmentFn) {
        self.capabilities.lock().render_state = Some(f);
    }

    pub fn render_state(&self) -> Option<String> {
        let f = self.capabilities.lock().render_state.clone();
        f.map(|f| f())
    }

    pub fn set_after_rendering(&self, hook: AfterRenderHook) {
        self.capabilities.lock().after_rendering = Some(hook);
    }

    pub fn after_rendering(&self) -> Option<AfterRenderHook> {
        self.capabilities.lock().after_rendering.clone()
    }

    // --- app state ---

    /// Store request-scoped state, e.g. auth info injected by a hook.
    pub fn insert_state(&self, key: impl Into<String>, value: Value) {
        self.state.lock().insert(key.into(), value);
    }

    pub fn get_state(&self, key: &str) -> Option<Value> {
        self.state.lock().get(key).cloned()
    }

    /// Snapshot of all request-scoped state.
    pub fn state(&self) -> serde_json::Map<String, Value> {
        self.state.lock().clone()
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("url", &self.url)
            .field("request_id", &self.request_id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
