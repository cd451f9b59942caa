//! Persona overlay resolver
//!
//! A closed set of coaching personas, each a tone/guidance overlay applied
//! on top of the core prompt. Lookup is total: unknown or absent personas
//! resolve to nothing, never an error. Recommendation is an ordered keyword
//! scan over the user's personal profile; the keyword lists and their order
//! are part of the contract.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::PersonalProfile;
use crate::session::Phase;

/// The closed set of persona identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    Analyst,
    Facilitator,
    Challenger,
}

impl PersonaId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Analyst => "analyst",
            PersonaId::Facilitator => "facilitator",
            PersonaId::Challenger => "challenger",
        }
    }

    /// Total parse; unknown keys are `None`, never an error
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "analyst" => Some(PersonaId::Analyst),
            "facilitator" => Some(PersonaId::Facilitator),
            "challenger" => Some(PersonaId::Challenger),
            _ => None,
        }
    }
}

/// Identity/tone text plus per-phase guidance
#[derive(Debug, Clone)]
pub struct PersonaDefinition {
    pub id: PersonaId,
    pub identity: &'static str,
    pub tone: &'static str,
    pub discovery_guidance: &'static str,
    pub research_guidance: &'static str,
    pub synthesis_guidance: &'static str,
    pub planning_guidance: &'static str,
}

static ANALYST: PersonaDefinition = PersonaDefinition {
    id: PersonaId::Analyst,
    identity: "You coach as the Analyst: rigorous, evidence-first, allergic to unsupported claims.",
    tone: "Keep language precise. Quantify where possible. Ask for the data behind every assertion.",
    discovery_guidance: "Anchor discovery in observable facts; ask what evidence would change their mind.",
    research_guidance: "Push for primary sources and sample sizes; flag anecdotes presented as findings.",
    synthesis_guidance: "Insist each canvas entry cites the research it rests on.",
    planning_guidance: "Require every bet to carry a measurable success metric and a falsification condition.",
};

static FACILITATOR: PersonaDefinition = PersonaDefinition {
    id: PersonaId::Facilitator,
    identity: "You coach as the Facilitator: warm, inclusive, focused on shared ownership of the strategy.",
    tone: "Invite rather than direct. Surface disagreement gently and name common ground explicitly.",
    discovery_guidance: "Draw out who else should be in the room; map stakeholders alongside problems.",
    research_guidance: "Encourage involving colleagues in the research itself, not just its results.",
    synthesis_guidance: "Frame canvas sections as drafts for the team to react to.",
    planning_guidance: "Assign each bet an owner and a forum where progress gets discussed.",
};

static CHALLENGER: PersonaDefinition = PersonaDefinition {
    id: PersonaId::Challenger,
    identity: "You coach as the Challenger: direct, fast-moving, intolerant of comfortable answers.",
    tone: "Be blunt but respectful. Shorten the path to the uncomfortable question.",
    discovery_guidance: "Challenge the framing itself; ask what they are avoiding.",
    research_guidance: "Push them toward the conversations they least want to have.",
    synthesis_guidance: "Strike canvas entries that restate hopes as facts.",
    planning_guidance: "Force-rank the bets; make them kill at least one.",
};

/// Resolve a persona definition; absent is not an error
pub fn resolve(id: PersonaId) -> Option<&'static PersonaDefinition> {
    let def = match id {
        PersonaId::Analyst => &ANALYST,
        PersonaId::Facilitator => &FACILITATOR,
        PersonaId::Challenger => &CHALLENGER,
    };
    Some(def)
}

/// The persona's prompt section (identity + tone), or empty when unresolvable
pub fn section(id: PersonaId) -> String {
    match resolve(id) {
        Some(def) => format!("{}\n{}", def.identity, def.tone),
        None => String::new(),
    }
}

/// Phase-specific guidance, or empty when unresolvable
pub fn phase_guidance(id: PersonaId, phase: Phase) -> &'static str {
    match resolve(id) {
        Some(def) => match phase {
            Phase::Discovery => def.discovery_guidance,
            Phase::Research => def.research_guidance,
            Phase::Synthesis => def.synthesis_guidance,
            Phase::Planning => def.planning_guidance,
        },
        None => "",
    }
}

/// A persona recommendation with its reasoning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRecommendation {
    pub persona: PersonaId,
    pub reasoning: String,
}

// Keyword lists for the ordered recommendation rules. Matching is
// case-insensitive substring over decision-making + communication text.
const ANALYST_SIGNALS: [&str; 4] = ["data", "analytic", "metric", "detail-oriented"];
const FACILITATOR_SIGNALS: [&str; 4] = ["consensus", "collaborative", "supportive", "team-first"];
const CHALLENGER_SIGNALS: [&str; 4] = ["directive", "intuitive", "direct", "decisive"];

/// Recommend a persona from a personal profile
///
/// Rules are evaluated top to bottom, first match wins:
/// analyst signals, then facilitator signals, then challenger signals,
/// then the Analyst default with a generic reasoning.
pub fn recommend(profile: &PersonalProfile) -> PersonaRecommendation {
    let haystack = format!(
        "{} {}",
        profile.decision_making.as_deref().unwrap_or(""),
        profile.communication_style.as_deref().unwrap_or(""),
    )
    .to_lowercase();

    if let Some(signal) = ANALYST_SIGNALS.iter().find(|s| haystack.contains(**s)) {
        debug!(%signal, "recommend: analyst signal matched");
        return PersonaRecommendation {
            persona: PersonaId::Analyst,
            reasoning: format!("Your profile signals an evidence-driven style (\"{signal}\"), which the Analyst matches."),
        };
    }
    if let Some(signal) = FACILITATOR_SIGNALS.iter().find(|s| haystack.contains(**s)) {
        debug!(%signal, "recommend: facilitator signal matched");
        return PersonaRecommendation {
            persona: PersonaId::Facilitator,
            reasoning: format!("Your profile signals a consensus-building style (\"{signal}\"), which the Facilitator matches."),
        };
    }
    if let Some(signal) = CHALLENGER_SIGNALS.iter().find(|s| haystack.contains(**s)) {
        debug!(%signal, "recommend: challenger signal matched");
        return PersonaRecommendation {
            persona: PersonaId::Challenger,
            reasoning: format!("Your profile signals a direct, instinct-led style (\"{signal}\"), which the Challenger matches."),
        };
    }

    PersonaRecommendation {
        persona: PersonaId::Analyst,
        reasoning: "No strong style signal found; the Analyst is a balanced starting point.".to_string(),
    }
}
