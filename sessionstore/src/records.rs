//! Row types persisted by the session store
//!
//! These are storage-shaped records. The coaching core owns the richer
//! domain types; the store only promises stable columns and ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::now_ms;

/// What kind of conversation a session row holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Regular strategy coaching conversation
    Coaching,
    /// Initial profiling conversation that produces a personal profile
    Profiling,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Coaching => "coaching",
            SessionKind::Profiling => "profiling",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "coaching" => Some(SessionKind::Coaching),
            "profiling" => Some(SessionKind::Profiling),
            _ => None,
        }
    }
}

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

/// Organization-level profile, keyed by org id
///
/// This is the authoritative side of the field-level merge the coaching
/// core performs; intake records fill the gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgProfile {
    pub org_id: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub strategic_focus: Option<String>,
    pub pain_points: Option<String>,
    pub prior_attempts: Option<String>,
    pub target_outcomes: Option<String>,
    pub success_metrics: Vec<String>,
    pub persona: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrgProfile {
    /// Create a new profile with only the required identity fields set
    pub fn new(org_id: impl Into<String>, company_name: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            org_id: org_id.into(),
            company_name: company_name.into(),
            industry: None,
            company_size: None,
            strategic_focus: None,
            pain_points: None,
            prior_attempts: None,
            target_outcomes: None,
            success_metrics: Vec::new(),
            persona: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Onboarding intake record, the fallback side of the context merge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub id: String,
    pub org_id: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub strategic_focus: Option<String>,
    pub pain_points: Option<String>,
    pub prior_attempts: Option<String>,
    pub target_outcomes: Option<String>,
    pub success_metrics: Vec<String>,
    pub persona: Option<String>,
    pub created_at: i64,
}

impl IntakeRecord {
    pub fn new(org_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            org_id: org_id.into(),
            company_name: None,
            industry: None,
            company_size: None,
            strategic_focus: None,
            pain_points: None,
            prior_attempts: None,
            target_outcomes: None,
            success_metrics: Vec::new(),
            persona: None,
            created_at: now_ms(),
        }
    }
}

/// One session row
///
/// `state_json` is an opaque blob owned by the coaching core. `phase` is a
/// mirror column an administrative path may overwrite out-of-band;
/// `highest_phase_reached` only ever advances (see `SessionStore::set_session_phase`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: String,
    pub org_id: String,
    pub user_id: Option<String>,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub phase: String,
    pub highest_phase_reached: String,
    pub state_json: String,
    /// Embedded profile data, set when a profiling session completes
    pub profile_json: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SessionRow {
    pub fn new(org_id: impl Into<String>, user_id: Option<String>, kind: SessionKind, state_json: String) -> Self {
        let now = now_ms();
        Self {
            id: Uuid::now_v7().to_string(),
            org_id: org_id.into(),
            user_id,
            kind,
            status: SessionStatus::Active,
            phase: "discovery".to_string(),
            highest_phase_reached: "discovery".to_string(),
            state_json,
            profile_json: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One mapped (or not yet mapped) research finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryInsightRow {
    pub id: String,
    pub session_id: String,
    /// One of the three fixed territory tags: company, customer, competitor
    pub territory: String,
    pub area: String,
    pub question: String,
    pub answer: String,
    /// "mapped" rows are visible to the aggregator
    pub status: String,
    pub created_at: i64,
}

impl TerritoryInsightRow {
    pub fn mapped(
        session_id: impl Into<String>,
        territory: impl Into<String>,
        area: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            session_id: session_id.into(),
            territory: territory.into(),
            area: area.into(),
            question: question.into(),
            answer: answer.into(),
            status: "mapped".to_string(),
            created_at: now_ms(),
        }
    }
}

/// One synthesis output; only the newest per session is ever read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRecord {
    pub id: String,
    pub session_id: String,
    /// JSON array of opportunities with nested scoring data
    pub opportunities_json: String,
    pub created_at: i64,
}

impl SynthesisRecord {
    pub fn new(session_id: impl Into<String>, opportunities_json: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            session_id: session_id.into(),
            opportunities_json: opportunities_json.into(),
            created_at: now_ms(),
        }
    }
}
