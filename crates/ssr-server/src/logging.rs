//! Request-scoped logging.

use std::fmt;

use http::StatusCode;
use ssr_core::{RenderMode, RequestId, TimingContext};
use tracing::{error, info};

/// Logs the outcome and duration of one request.
#[derive(Debug, Clone)]
pub struct RequestLog {
    request_id: RequestId,
    url: String,
    mode: RenderMode,
    timing: TimingContext,
}

impl RequestLog {
    pub fn new(request_id: RequestId, url: impl Into<String>, mode: RenderMode) -> Self {
        Self {
            request_id,
            url: url.into(),
            mode,
            timing: TimingContext::new(),
        }
    }

    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    pub fn mark(&mut self, name: &str) {
        self.timing.mark(name);
    }

    /// Log a failed render.
    pub fn render_error(&self, err: &dyn fmt::Display) {
        let message = format_render_error(self.mode, &self.url, err, self.timing.elapsed_ms());
        error!(
            request_id = %self.request_id,
            url = %self.url,
            elapsed_ms = self.timing.elapsed_ms() as u64,
            "{}",
            message
        );
    }

    /// Log the request duration once the response has ended.
    pub fn finished(&self, status: StatusCode) {
        let elapsed_ms = self.timing.elapsed_ms() as u64;
        info!(
            request_id = %self.request_id,
            url = %self.url,
            status = status.as_u16(),
            elapsed_ms,
            first_chunk_ms = self.timing.time_to_first_chunk().map(|d| d.as_millis() as u64),
            "Request duration: {}ms",
            elapsed_ms
        );
    }
}

/// Render failure message for a mode.
///
/// Production messages are a single line; development keeps the full
/// error and the time spent before it failed.
pub fn format_render_error(
    mode: RenderMode,
    url: &str,
    err: &dyn fmt::Display,
    elapsed_ms: u128,
) -> String {
    match mode {
        RenderMode::Production => {
            format!("Error during render : {} | {}", url, single_line(&err.to_string()))
        }
        RenderMode::Development => {
            format!("Error during render : {}\n{}\n(after {}ms)", url, err, elapsed_ms)
        }
    }
}

/// Every CR and LF becomes its own separator.
fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " -> ")
}
