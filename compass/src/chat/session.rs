//! Coaching chat session
//!
//! Composes the instruction document for a turn and drives the backend
//! call, blocking or streaming. Failures propagate unmodified; there is
//! no retry or recovery here.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::stream::{ChatError, ResolvedUsage, StreamingReply, UsageHandle};
use crate::context::ClientContext;
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason};
use crate::prompts::build_coaching_prompt;
use crate::session::SessionState;
use crate::telemetry::{TelemetrySink, UsageEvent, emit_best_effort};

const EVENT_BUFFER: usize = 256;

/// Result of one blocking (non-streaming) turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub stop_reason: StopReason,
}

/// One coaching conversation against the LLM backend
pub struct CoachingChat {
    llm: Arc<dyn LlmClient>,
    telemetry: Arc<dyn TelemetrySink>,
    model: String,
    max_tokens: u32,
    session_id: String,
}

impl CoachingChat {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        telemetry: Arc<dyn TelemetrySink>,
        model: impl Into<String>,
        max_tokens: u32,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            telemetry,
            model: model.into(),
            max_tokens,
            session_id: session_id.into(),
        }
    }

    /// Compose the full request for one turn: fresh prompt document plus
    /// the ordered history plus the new user message
    fn build_request(
        &self,
        context: &ClientContext,
        state: &SessionState,
        history: &[Message],
        user_message: &str,
    ) -> CompletionRequest {
        let system_prompt = build_coaching_prompt(context, state);
        let mut messages = history.to_vec();
        messages.push(Message::user(user_message));
        debug!(
            history_len = history.len(),
            prompt_len = system_prompt.len(),
            "build_request: composed"
        );
        CompletionRequest {
            system_prompt,
            messages,
            max_tokens: self.max_tokens,
        }
    }

    /// One blocking turn: Idle -> Composing -> Completed | Failed
    pub async fn send_once(
        &self,
        context: &ClientContext,
        state: &SessionState,
        history: &[Message],
        user_message: &str,
    ) -> Result<TurnReply, ChatError> {
        let request = self.build_request(context, state, history, user_message);
        let response = self.llm.complete(request).await?;

        Ok(TurnReply {
            content: response.content,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
            stop_reason: response.stop_reason,
        })
    }

    /// One streaming turn: Idle -> Composing -> Streaming -> Completed | Failed
    ///
    /// Returns immediately with the lazy fragment sequence and the
    /// deferred usage handle. When the backend signals end-of-stream the
    /// driver resolves usage, computes wall-clock latency from request
    /// start, and emits one telemetry event; a telemetry failure is logged
    /// and swallowed. Dropping the reply early abandons the stream without
    /// cancelling the upstream call.
    pub fn send_streaming(
        &self,
        context: &ClientContext,
        state: &SessionState,
        history: &[Message],
        user_message: &str,
    ) -> StreamingReply {
        let request = self.build_request(context, state, history, user_message);

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (usage_tx, usage_rx) = oneshot::channel();

        let llm = Arc::clone(&self.llm);
        let telemetry = Arc::clone(&self.telemetry);
        let model = self.model.clone();
        let session_id = self.session_id.clone();
        let started = Instant::now();

        tokio::spawn(async move {
            match llm.stream(request, event_tx).await {
                Ok(response) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    emit_best_effort(
                        telemetry.as_ref(),
                        UsageEvent {
                            model,
                            input_tokens: response.usage.input_tokens,
                            output_tokens: response.usage.output_tokens,
                            latency_ms,
                            session_id,
                        },
                    )
                    .await;
                    let _ = usage_tx.send(Ok(ResolvedUsage {
                        input_tokens: response.usage.input_tokens,
                        output_tokens: response.usage.output_tokens,
                        stop_reason: response.stop_reason,
                        latency_ms,
                    }));
                }
                Err(e) => {
                    debug!(error = %e, "send_streaming: backend call failed");
                    let _ = usage_tx.send(Err(ChatError::Llm(e)));
                }
            }
        });

        StreamingReply {
            events: event_rx,
            usage: UsageHandle { rx: usage_rx },
        }
    }
}
