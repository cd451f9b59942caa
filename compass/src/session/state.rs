//! Canonical session progress record
//!
//! Persisted as an opaque JSON blob keyed by session id. The blob carries
//! its own schema version; decoding validates the version instead of
//! trusting the stored shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema version written into every persisted blob
pub const SESSION_STATE_VERSION: u32 = 1;

/// The four coaching phases, in methodology order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Discovery,
    Research,
    Synthesis,
    Planning,
}

impl Phase {
    /// Position in the methodology, 0-indexed
    pub fn ord(&self) -> u8 {
        match self {
            Phase::Discovery => 0,
            Phase::Research => 1,
            Phase::Synthesis => 2,
            Phase::Planning => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Discovery => "discovery",
            Phase::Research => "research",
            Phase::Synthesis => "synthesis",
            Phase::Planning => "planning",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three fixed research pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarKey {
    MacroMarket,
    Customer,
    Colleague,
}

impl PillarKey {
    /// All pillars in methodology order
    pub const ALL: [PillarKey; 3] = [PillarKey::MacroMarket, PillarKey::Customer, PillarKey::Colleague];

    pub fn label(&self) -> &'static str {
        match self {
            PillarKey::MacroMarket => "macro-market",
            PillarKey::Customer => "customer",
            PillarKey::Colleague => "colleague",
        }
    }
}

/// Progress within one research pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PillarProgress {
    pub started: bool,
    pub completed: bool,
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_explored_at: Option<DateTime<Utc>>,
}

impl PillarProgress {
    /// Score used by the progress calculator: 1.0 completed, 0.5 started, else 0.0
    pub fn score(&self) -> f64 {
        if self.completed {
            1.0
        } else if self.started {
            0.5
        } else {
            0.0
        }
    }
}

/// The three pillar records, one per [`PillarKey`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResearchPillars {
    pub macro_market: PillarProgress,
    pub customer: PillarProgress,
    pub colleague: PillarProgress,
}

impl ResearchPillars {
    pub fn get(&self, key: PillarKey) -> &PillarProgress {
        match key {
            PillarKey::MacroMarket => &self.macro_market,
            PillarKey::Customer => &self.customer,
            PillarKey::Colleague => &self.colleague,
        }
    }

    pub fn get_mut(&mut self, key: PillarKey) -> &mut PillarProgress {
        match key {
            PillarKey::MacroMarket => &mut self.macro_market,
            PillarKey::Customer => &mut self.customer,
            PillarKey::Colleague => &mut self.colleague,
        }
    }

    /// Iterate pillars in methodology order
    pub fn iter(&self) -> impl Iterator<Item = (PillarKey, &PillarProgress)> {
        PillarKey::ALL.iter().map(move |k| (*k, self.get(*k)))
    }

    /// Count of completed pillars
    pub fn completed_count(&self) -> usize {
        self.iter().filter(|(_, p)| p.completed).count()
    }
}

/// The five synthesis-canvas sections, in walk order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasSection {
    MarketReality,
    CustomerInsights,
    OrganizationalContext,
    StrategicSynthesis,
    TeamContext,
}

impl CanvasSection {
    /// Fixed walk order used by the advisor and the calculator
    pub const ALL: [CanvasSection; 5] = [
        CanvasSection::MarketReality,
        CanvasSection::CustomerInsights,
        CanvasSection::OrganizationalContext,
        CanvasSection::StrategicSynthesis,
        CanvasSection::TeamContext,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CanvasSection::MarketReality => "market reality",
            CanvasSection::CustomerInsights => "customer insights",
            CanvasSection::OrganizationalContext => "organizational context",
            CanvasSection::StrategicSynthesis => "strategic synthesis",
            CanvasSection::TeamContext => "team context",
        }
    }
}

/// Five independent completion flags; no cross-flag rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CanvasProgress {
    pub market_reality: bool,
    pub customer_insights: bool,
    pub organizational_context: bool,
    pub strategic_synthesis: bool,
    pub team_context: bool,
}

impl CanvasProgress {
    pub fn get(&self, section: CanvasSection) -> bool {
        match section {
            CanvasSection::MarketReality => self.market_reality,
            CanvasSection::CustomerInsights => self.customer_insights,
            CanvasSection::OrganizationalContext => self.organizational_context,
            CanvasSection::StrategicSynthesis => self.strategic_synthesis,
            CanvasSection::TeamContext => self.team_context,
        }
    }

    pub fn set(&mut self, section: CanvasSection, value: bool) {
        match section {
            CanvasSection::MarketReality => self.market_reality = value,
            CanvasSection::CustomerInsights => self.customer_insights = value,
            CanvasSection::OrganizationalContext => self.organizational_context = value,
            CanvasSection::StrategicSynthesis => self.strategic_synthesis = value,
            CanvasSection::TeamContext => self.team_context = value,
        }
    }

    /// Count of completed sections
    pub fn completed_count(&self) -> usize {
        CanvasSection::ALL.iter().filter(|s| self.get(**s)).count()
    }
}

/// A captured belief → implication → exploration → metric record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicBet {
    pub id: String,
    pub belief: String,
    pub implication: String,
    pub exploration: String,
    pub success_metric: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pillar_source: Option<PillarKey>,
}

/// The full per-session progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub version: u32,
    pub current_phase: Phase,
    pub research_pillars: ResearchPillars,
    pub canvas_progress: CanvasProgress,
    pub strategic_bets: Vec<StrategicBet>,
    pub key_insights: Vec<String>,
    pub session_count: u32,
    pub total_message_count: u32,
    pub last_activity_at: DateTime<Utc>,
}

/// Errors decoding a persisted blob
#[derive(Debug, Error)]
pub enum StateDecodeError {
    #[error("Invalid session state JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported session state version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl SessionState {
    /// Fresh state for a new session: all flags false, all lists empty
    pub fn new() -> Self {
        Self {
            version: SESSION_STATE_VERSION,
            current_phase: Phase::Discovery,
            research_pillars: ResearchPillars::default(),
            canvas_progress: CanvasProgress::default(),
            strategic_bets: Vec::new(),
            key_insights: Vec::new(),
            session_count: 1,
            total_message_count: 0,
            last_activity_at: Utc::now(),
        }
    }

    /// Serialize for persistence
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a persisted blob, validating the schema version
    pub fn decode(blob: &str) -> Result<Self, StateDecodeError> {
        let state: SessionState = serde_json::from_str(blob)?;
        if state.version != SESSION_STATE_VERSION {
            return Err(StateDecodeError::UnsupportedVersion {
                found: state.version,
                supported: SESSION_STATE_VERSION,
            });
        }
        Ok(state)
    }

    /// True if no pillar has been started
    pub fn no_pillar_started(&self) -> bool {
        self.research_pillars.iter().all(|(_, p)| !p.started)
    }

    /// True if all three pillars are completed
    pub fn all_pillars_completed(&self) -> bool {
        self.research_pillars.iter().all(|(_, p)| p.completed)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_empty() {
        let state = SessionState::new();
        assert_eq!(state.version, SESSION_STATE_VERSION);
        assert_eq!(state.current_phase, Phase::Discovery);
        assert!(state.no_pillar_started());
        assert!(!state.all_pillars_completed());
        assert_eq!(state.canvas_progress.completed_count(), 0);
        assert!(state.strategic_bets.is_empty());
        assert_eq!(state.total_message_count, 0);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut state = SessionState::new();
        state.research_pillars.customer.started = true;
        state.canvas_progress.set(CanvasSection::MarketReality, true);
        state.key_insights.push("Mid-market churn is pricing driven".to_string());

        let blob = state.encode().unwrap();
        let decoded = SessionState::decode(&blob).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut state = SessionState::new();
        state.version = 99;
        let blob = state.encode().unwrap();

        let err = SessionState::decode(&blob).unwrap_err();
        assert!(matches!(err, StateDecodeError::UnsupportedVersion { found: 99, .. }));
    }

    #[test]
    fn test_decode_rejects_malformed_blob() {
        assert!(matches!(
            SessionState::decode("not json").unwrap_err(),
            StateDecodeError::Json(_)
        ));
    }

    #[test]
    fn test_pillar_score() {
        let mut pillar = PillarProgress::default();
        assert_eq!(pillar.score(), 0.0);
        pillar.started = true;
        assert_eq!(pillar.score(), 0.5);
        pillar.completed = true;
        assert_eq!(pillar.score(), 1.0);
    }

    #[test]
    fn test_canvas_walk_order() {
        // The advisor depends on this exact order.
        let labels: Vec<&str> = CanvasSection::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec![
                "market reality",
                "customer insights",
                "organizational context",
                "strategic synthesis",
                "team context",
            ]
        );
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Discovery.ord() < Phase::Research.ord());
        assert!(Phase::Research.ord() < Phase::Synthesis.ord());
        assert!(Phase::Synthesis.ord() < Phase::Planning.ord());
    }
}
