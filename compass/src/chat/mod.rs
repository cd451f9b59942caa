//! Streaming chat manager
//!
//! Drives one language-model call per coaching turn. A turn moves through
//! Idle -> Composing -> Streaming -> Completed | Failed (the non-streaming
//! path skips Streaming). The manager adds no retries, no timeouts, and no
//! cancellation signalling: stopping early simply abandons the remaining
//! fragments.

mod session;
mod stream;

pub use session::{CoachingChat, TurnReply};
pub use stream::{ChatError, ResolvedUsage, StreamingReply, UsageHandle};
