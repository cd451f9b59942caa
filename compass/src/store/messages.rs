//! Store actor messages
//!
//! Commands and responses for the actor pattern.

use sessionstore::{
    IntakeRecord, OrgProfile, SessionRow, SessionStatus, SynthesisRecord, TerritoryInsightRow,
};
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors from store operations as seen by async callers
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Store(#[from] sessionstore::StoreError),

    #[error("Store channel closed")]
    ChannelClosed,
}

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

/// Commands sent to the store actor
#[derive(Debug)]
pub enum StoreCommand {
    // Org profiles / intake
    UpsertOrgProfile {
        profile: OrgProfile,
        reply: Reply<()>,
    },
    GetOrgProfile {
        org_id: String,
        reply: Reply<Option<OrgProfile>>,
    },
    InsertIntake {
        record: IntakeRecord,
        reply: Reply<()>,
    },
    GetLatestIntake {
        org_id: String,
        reply: Reply<Option<IntakeRecord>>,
    },

    // Sessions
    CreateSession {
        row: SessionRow,
        reply: Reply<()>,
    },
    GetSession {
        id: String,
        reply: Reply<Option<SessionRow>>,
    },
    UpdateSessionState {
        id: String,
        state_json: String,
        reply: Reply<()>,
    },
    SetSessionStatus {
        id: String,
        status: SessionStatus,
        reply: Reply<()>,
    },
    SetSessionProfile {
        id: String,
        profile_json: String,
        reply: Reply<()>,
    },
    SetSessionPhase {
        id: String,
        phase: String,
        reply: Reply<()>,
    },
    LatestProfiling {
        user_id: String,
        org_id: String,
        reply: Reply<Option<SessionRow>>,
    },

    // Research artifacts
    InsertInsight {
        row: TerritoryInsightRow,
        reply: Reply<()>,
    },
    MappedInsights {
        session_id: String,
        reply: Reply<Vec<TerritoryInsightRow>>,
    },
    InsertSynthesis {
        record: SynthesisRecord,
        reply: Reply<()>,
    },
    LatestSynthesis {
        session_id: String,
        reply: Reply<Option<SynthesisRecord>>,
    },

    // Shutdown
    Shutdown,
}
