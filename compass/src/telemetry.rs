//! Telemetry sink
//!
//! Fire-and-forget usage events. Emission failures are logged and fully
//! swallowed; they must never reach the conversation path.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// One usage event per completed streaming turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEvent {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
    pub session_id: String,
}

/// Errors a sink may produce; callers swallow them
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Telemetry emission failed: {0}")]
    Emission(String),
}

/// Fire-and-forget event sink
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn emit(&self, event: UsageEvent) -> Result<(), TelemetryError>;
}

/// Default sink: structured log line per event
pub struct TracingSink;

#[async_trait]
impl TelemetrySink for TracingSink {
    async fn emit(&self, event: UsageEvent) -> Result<(), TelemetryError> {
        info!(
            model = %event.model,
            input_tokens = event.input_tokens,
            output_tokens = event.output_tokens,
            latency_ms = event.latency_ms,
            session_id = %event.session_id,
            "coaching_turn_completed"
        );
        Ok(())
    }
}

/// Sink that drops everything (telemetry disabled)
pub struct NoopSink;

#[async_trait]
impl TelemetrySink for NoopSink {
    async fn emit(&self, _event: UsageEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Emit an event, logging and swallowing any failure
pub async fn emit_best_effort(sink: &dyn TelemetrySink, event: UsageEvent) {
    if let Err(e) = sink.emit(event).await {
        warn!(error = %e, "Telemetry emission failed; continuing");
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Captures emitted events for assertions
    #[derive(Default)]
    pub struct CapturingSink {
        pub events: Mutex<Vec<UsageEvent>>,
    }

    #[async_trait]
    impl TelemetrySink for CapturingSink {
        async fn emit(&self, event: UsageEvent) -> Result<(), TelemetryError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    /// Always fails; used to prove failures never propagate
    pub struct FailingSink;

    #[async_trait]
    impl TelemetrySink for FailingSink {
        async fn emit(&self, _event: UsageEvent) -> Result<(), TelemetryError> {
            Err(TelemetryError::Emission("sink unavailable".to_string()))
        }
    }
}
