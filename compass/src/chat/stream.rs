//! Lazy reply stream and deferred usage
//!
//! A [`StreamingReply`] is a finite, non-restartable sequence of text
//! fragments plus a [`UsageHandle`] that resolves exactly once, after the
//! backend signals end-of-stream. The handle is designed to be resolved
//! after the fragment sequence is exhausted; resolving earlier blocks
//! until the stream finishes rather than erroring.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::llm::{LlmError, StopReason, StreamEvent};

/// Errors surfaced by the chat manager
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Mid-stream failure, surfaced at the point of failure
    #[error("Stream error: {0}")]
    Stream(String),

    /// The driver task went away without resolving usage
    #[error("Stream ended without resolution")]
    Abandoned,
}

/// Final usage for one streaming turn, resolved once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub stop_reason: StopReason,
    pub latency_ms: u64,
}

/// Deferred usage accessor; consuming it enforces resolve-at-most-once
pub struct UsageHandle {
    pub(super) rx: oneshot::Receiver<Result<ResolvedUsage, ChatError>>,
}

impl UsageHandle {
    /// Block until the backend signals end-of-stream, then return usage
    ///
    /// Intended to be called after the fragment sequence is fully
    /// consumed. Failures that prevented resolution (including failures
    /// before the first fragment) are returned unmodified.
    pub async fn resolve(self) -> Result<ResolvedUsage, ChatError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => {
                debug!("UsageHandle::resolve: driver dropped before resolution");
                Err(ChatError::Abandoned)
            }
        }
    }
}

/// One in-flight streaming reply
pub struct StreamingReply {
    pub(super) events: mpsc::Receiver<StreamEvent>,
    pub(super) usage: UsageHandle,
}

impl StreamingReply {
    /// Next text fragment, or `None` when the stream is exhausted
    ///
    /// Mid-stream failures appear here as `Err` at the point of failure;
    /// after one, the sequence ends.
    pub async fn next_fragment(&mut self) -> Option<Result<String, ChatError>> {
        loop {
            match self.events.recv().await? {
                StreamEvent::MessageStart { input_tokens } => {
                    debug!(input_tokens, "next_fragment: message start");
                }
                StreamEvent::TextDelta(text) => return Some(Ok(text)),
                StreamEvent::MessageDone { .. } => {
                    debug!("next_fragment: message done");
                    return None;
                }
                StreamEvent::Error(message) => {
                    self.events.close();
                    return Some(Err(ChatError::Stream(message)));
                }
            }
        }
    }

    /// Collect all remaining fragments into one string (helper for tests
    /// and non-interactive callers)
    pub async fn collect_text(&mut self) -> Result<String, ChatError> {
        let mut text = String::new();
        while let Some(fragment) = self.next_fragment().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    /// Split into the exhausted-stream usage handle
    ///
    /// Call after the fragment sequence returned `None`.
    pub fn into_usage(self) -> UsageHandle {
        self.usage
    }
}
