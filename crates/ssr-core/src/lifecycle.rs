//! Request lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Phases a request passes through in the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPhase {
    /// Request received, no renderer consulted yet.
    Start,
    /// The renderer is producing output.
    Rendering,
    /// The first chunk has been written.
    FirstChunk,
    /// A hook answered with a redirect; nothing was written by the handler.
    Redirected,
    /// Response ended successfully.
    Completion,
    /// Response ended with the error body.
    Error(String),
}

impl RequestPhase {
    /// Whether the response has been ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirected | Self::Completion | Self::Error(_))
    }
}

/// Timing context for request duration logging.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Time from start to a mark.
    pub fn since_start(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Get time to first chunk.
    pub fn time_to_first_chunk(&self) -> Option<Duration> {
        self.since_start("first_chunk")
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed milliseconds, as logged per request.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
