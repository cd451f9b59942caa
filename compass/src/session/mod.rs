//! Session state machine
//!
//! The durable heart of a coaching conversation: the versioned progress
//! record, the pure transition engine that advances it, the progress
//! calculator, and the next-focus advisor.

pub mod advisor;
pub mod progress;
pub mod state;
pub mod transition;

pub use advisor::suggest_next_focus;
pub use progress::{ProgressSummary, summarize};
pub use state::{
    CanvasProgress, CanvasSection, Phase, PillarKey, PillarProgress, ResearchPillars, SESSION_STATE_VERSION,
    SessionState, StateDecodeError, StrategicBet,
};
pub use transition::{StateUpdate, apply_update};
