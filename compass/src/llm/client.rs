//! LlmClient trait definition

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// Backend-agnostic LLM client
///
/// Both methods make exactly one attempt. Retry, backoff, and timeouts are
/// the caller's responsibility; the chat manager does not add any.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request, blocking until the full reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Streaming completion
    ///
    /// Sends typed events to the provided channel as they arrive and
    /// returns the assembled final response. A failure before the first
    /// fragment is returned as the error; a mid-stream failure surfaces
    /// as a [`StreamEvent::Error`] followed by the same error return.
    async fn stream(
        &self,
        request: CompletionRequest,
        event_tx: mpsc::Sender<StreamEvent>,
    ) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::{StopReason, TokenUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted LLM client for unit tests
    pub struct MockLlmClient {
        /// Fragments emitted by `stream` before completing
        pub chunks: Vec<String>,
        pub stop_reason: StopReason,
        pub usage: TokenUsage,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(chunks: Vec<&str>, usage: TokenUsage) -> Self {
            Self {
                chunks: chunks.into_iter().map(String::from).collect(),
                stop_reason: StopReason::EndTurn,
                usage,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse {
                content: self.chunks.concat(),
                stop_reason: self.stop_reason,
                usage: self.usage,
            })
        }

        async fn stream(
            &self,
            _request: CompletionRequest,
            event_tx: mpsc::Sender<StreamEvent>,
        ) -> Result<CompletionResponse, LlmError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let _ = event_tx
                .send(StreamEvent::MessageStart {
                    input_tokens: self.usage.input_tokens,
                })
                .await;
            for chunk in &self.chunks {
                let _ = event_tx.send(StreamEvent::TextDelta(chunk.clone())).await;
            }
            let _ = event_tx
                .send(StreamEvent::MessageDone {
                    stop_reason: self.stop_reason,
                    usage: self.usage,
                })
                .await;
            Ok(CompletionResponse {
                content: self.chunks.concat(),
                stop_reason: self.stop_reason,
                usage: self.usage,
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_streams_scripted_chunks() {
            let client = MockLlmClient::new(
                vec!["Hello", " world"],
                TokenUsage {
                    input_tokens: 10,
                    output_tokens: 2,
                },
            );

            let (tx, mut rx) = mpsc::channel(16);
            let request = CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![],
                max_tokens: 100,
            };

            let response = client.stream(request, tx).await.unwrap();
            assert_eq!(response.content, "Hello world");

            let mut text = String::new();
            while let Some(event) = rx.recv().await {
                if let StreamEvent::TextDelta(delta) = event {
                    text.push_str(&delta);
                }
            }
            assert_eq!(text, "Hello world");
            assert_eq!(client.call_count(), 1);
        }
    }
}
