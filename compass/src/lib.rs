//! Compass - Conversational Strategy Coaching Agent
//!
//! Compass walks an executive through a fixed four-phase strategy
//! methodology (Discovery -> Research -> Synthesis -> Planning), keeps
//! durable progress across sessions, and composes a full instruction
//! document per turn for the language-model backend, streaming the reply
//! back while resolving usage and telemetry.
//!
//! # Core Concepts
//!
//! - **Snapshot state machine**: session progress is a versioned record;
//!   the transition engine is pure and never mutates its input
//! - **Deterministic heuristics**: progress percentages and the next-focus
//!   recommendation are pure functions of the snapshot
//! - **Fresh prompt every turn**: the instruction document is rebuilt from
//!   context + state on every request, never cached or mutated
//! - **No hidden resilience**: backend failures propagate unmodified;
//!   retries and timeouts belong to the caller
//!
//! # Modules
//!
//! - [`session`] - State model, transition engine, progress, advisor
//! - [`context`] - Client context aggregation from the store
//! - [`persona`] - Persona overlays and recommendation
//! - [`prompts`] - Prompt composition
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`chat`] - Streaming chat manager
//! - [`telemetry`] - Fire-and-forget usage events
//! - [`store`] - Async actor over the SQLite session store
//! - [`config`] - Configuration types and loading

pub mod chat;
pub mod cli;
pub mod config;
pub mod context;
pub mod llm;
pub mod persona;
pub mod prompts;
pub mod repl;
pub mod session;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use chat::{ChatError, CoachingChat, ResolvedUsage, StreamingReply, TurnReply, UsageHandle};
pub use config::{Config, LlmConfig};
pub use context::{ClientContext, ContextAggregator, ContextError, PersonalProfile, StrategicFocus};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, Role, StopReason};
pub use persona::{PersonaId, PersonaRecommendation, recommend};
pub use prompts::{
    ProfilingState, ProfilingStatus, build_coaching_prompt, build_intake_prompt, generate_opening_message,
};
pub use session::{
    CanvasSection, Phase, PillarKey, ProgressSummary, SessionState, StateUpdate, apply_update, suggest_next_focus,
    summarize,
};
pub use store::{StoreError, StoreHandle, spawn_store};
pub use telemetry::{NoopSink, TelemetrySink, TracingSink, UsageEvent};
