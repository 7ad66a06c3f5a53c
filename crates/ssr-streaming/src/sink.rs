//! Write-many, end-once response writer.

use std::fmt::Display;

use bytes::Bytes;
use futures::{Sink, SinkExt};
use ssr_core::{RequestPhase, TimingContext};

/// Errors raised by [`ResponseSink`].
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Response already ended")]
    AlreadyEnded,

    #[error("Response body closed: {0}")]
    Closed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Initial,
    Writing,
    Ended,
}

/// Response body writer.
///
/// Generic over any `Sink<Bytes>`; the server feeds it into a streaming
/// response body. The response is ended exactly once, and nothing can be
/// written after that.
pub struct ResponseSink<S, E>
where
    S: Sink<Bytes, Error = E> + Unpin,
    E: Display,
{
    inner: S,
    state: SinkState,
    timing: TimingContext,
    chunks_sent: usize,
    failed: bool,
}

impl<S, E> ResponseSink<S, E>
where
    S: Sink<Bytes, Error = E> + Unpin,
    E: Display,
{
    pub fn new(sink: S, timing: TimingContext) -> Self {
        Self {
            inner: sink,
            state: SinkState::Initial,
            timing,
            chunks_sent: 0,
            failed: false,
        }
    }

    /// Write one chunk.
    pub async fn write(&mut self, chunk: impl Into<Bytes>) -> Result<(), SinkError> {
        if self.state == SinkState::Ended {
            return Err(SinkError::AlreadyEnded);
        }

        self.inner
            .send(chunk.into())
            .await
            .map_err(|e| SinkError::Closed(e.to_string()))?;

        if self.state == SinkState::Initial {
            self.timing.mark("first_chunk");
            self.state = SinkState::Writing;
        }
        self.chunks_sent += 1;

        Ok(())
    }

    /// End the response, optionally with a final chunk.
    pub async fn end(&mut self, last: Option<Bytes>) -> Result<(), SinkError> {
        if self.state == SinkState::Ended {
            return Err(SinkError::AlreadyEnded);
        }

        if let Some(last) = last {
            self.write(last).await?;
        }
        self.state = SinkState::Ended;
        self.timing.mark("complete");

        self.inner
            .close()
            .await
            .map_err(|e| SinkError::Closed(e.to_string()))
    }

    /// End the response with an error body.
    pub async fn fail(&mut self, body: &'static str) -> Result<(), SinkError> {
        self.failed = true;
        self.end(Some(Bytes::from_static(body.as_bytes()))).await
    }

    pub fn is_ended(&self) -> bool {
        self.state == SinkState::Ended
    }

    pub fn chunks_sent(&self) -> usize {
        self.chunks_sent
    }

    /// Get the current request phase.
    pub fn phase(&self) -> RequestPhase {
        match self.state {
            SinkState::Initial => RequestPhase::Rendering,
            SinkState::Writing => RequestPhase::FirstChunk,
            SinkState::Ended if self.failed => RequestPhase::Error("render failed".to_string()),
            SinkState::Ended => RequestPhase::Completion,
        }
    }

    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::StreamExt;

    fn sink() -> (
        ResponseSink<mpsc::UnboundedSender<Bytes>, mpsc::SendError>,
        mpsc::UnboundedReceiver<Bytes>,
    ) {
        let (tx, rx) = mpsc::unbounded();
        (ResponseSink::new(tx, TimingContext::new()), rx)
    }

    #[tokio::test]
    async fn test_write_then_end() {
        let (mut sink, rx) = sink();

        sink.write("<html>").await.unwrap();
        sink.write("</html>").await.unwrap();
        sink.end(None).await.unwrap();

        let chunks: Vec<Bytes> = rx.collect().await;
        assert_eq!(chunks, vec![Bytes::from("<html>"), Bytes::from("</html>")]);
        assert_eq!(sink.phase(), RequestPhase::Completion);
        assert!(sink.timing().time_to_first_chunk().is_some());
    }

    #[tokio::test]
    async fn test_end_exactly_once() {
        let (mut sink, _rx) = sink();

        sink.end(Some(Bytes::from("done"))).await.unwrap();

        assert!(matches!(sink.end(None).await, Err(SinkError::AlreadyEnded)));
        assert!(matches!(sink.write("late").await, Err(SinkError::AlreadyEnded)));
        assert_eq!(sink.chunks_sent(), 1);
    }

    #[tokio::test]
    async fn test_fail_appends_error_body() {
        let (mut sink, rx) = sink();

        sink.write("<p>partial").await.unwrap();
        sink.fail("500 | Internal Server Error").await.unwrap();

        let chunks: Vec<Bytes> = rx.collect().await;
        assert_eq!(chunks.last().unwrap(), &Bytes::from("500 | Internal Server Error"));
        assert!(matches!(sink.phase(), RequestPhase::Error(_)));
    }

    #[tokio::test]
    async fn test_closed_receiver() {
        let (mut sink, rx) = sink();
        drop(rx);

        assert!(matches!(sink.write("x").await, Err(SinkError::Closed(_))));
        assert_eq!(sink.phase(), RequestPhase::Rendering);
    }
}
