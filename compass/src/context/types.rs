//! Derived context types
//!
//! None of these are persisted by the core; they are rebuilt per request
//! from store records.

use serde::{Deserialize, Serialize};

use crate::persona::PersonaId;

/// The closed set of strategic focus areas an organization can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicFocus {
    Growth,
    Profitability,
    MarketEntry,
    Turnaround,
    Innovation,
    OperationalExcellence,
}

impl StrategicFocus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "growth" => Some(StrategicFocus::Growth),
            "profitability" => Some(StrategicFocus::Profitability),
            "market_entry" => Some(StrategicFocus::MarketEntry),
            "turnaround" => Some(StrategicFocus::Turnaround),
            "innovation" => Some(StrategicFocus::Innovation),
            "operational_excellence" => Some(StrategicFocus::OperationalExcellence),
            _ => None,
        }
    }

    /// Fixed human-readable description attached to the client context
    pub fn description(&self) -> &'static str {
        match self {
            StrategicFocus::Growth => "Expanding revenue and market share beyond the current trajectory",
            StrategicFocus::Profitability => "Improving margins and unit economics without sacrificing the core",
            StrategicFocus::MarketEntry => "Entering a new market, segment, or geography",
            StrategicFocus::Turnaround => "Reversing decline and restoring a viable core business",
            StrategicFocus::Innovation => "Building new offerings ahead of where the market is going",
            StrategicFocus::OperationalExcellence => "Making the existing machine measurably faster and cheaper",
        }
    }
}

/// Personal working profile produced by the profiling conversation
///
/// Serialized in camelCase because the completion marker the profiling
/// session emits uses that shape; the store blob is the same object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalProfile {
    pub role: Option<String>,
    pub objectives: Option<String>,
    pub leadership_style: Option<String>,
    pub experience: Option<String>,
    pub working_style: Option<String>,
    pub decision_making: Option<String>,
    pub communication_style: Option<String>,
}

/// Merged client context handed to the prompt composer
///
/// Built field-by-field from the organization profile (wins) and the
/// onboarding intake record (fallback); missing on both sides stays `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientContext {
    pub org_id: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub strategic_focus: Option<StrategicFocus>,
    pub pain_points: Option<String>,
    pub prior_attempts: Option<String>,
    pub target_outcomes: Option<String>,
    pub success_metrics: Vec<String>,
    pub persona: Option<PersonaId>,
    pub personal_profile: Option<PersonalProfile>,
}

impl ClientContext {
    /// Focus description from the fixed lookup table
    pub fn focus_description(&self) -> Option<&'static str> {
        self.strategic_focus.map(|f| f.description())
    }
}

/// The three fixed research territories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Territory {
    Company,
    Customer,
    Competitor,
}

impl Territory {
    pub const ALL: [Territory; 3] = [Territory::Company, Territory::Customer, Territory::Competitor];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "company" => Some(Territory::Company),
            "customer" => Some(Territory::Customer),
            "competitor" => Some(Territory::Competitor),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Territory::Company => "company",
            Territory::Customer => "customer",
            Territory::Competitor => "competitor",
        }
    }
}

/// One mapped question/answer pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightEntry {
    pub question: String,
    pub answer: String,
}

/// Mapped insights for one territory: an area label plus ordered Q/A pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryGroup {
    pub territory: Territory,
    pub area: String,
    pub entries: Vec<InsightEntry>,
}

/// Mapped insights grouped by the three fixed territories
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerritoryInsights {
    pub company: Option<TerritoryGroup>,
    pub customer: Option<TerritoryGroup>,
    pub competitor: Option<TerritoryGroup>,
}

impl TerritoryInsights {
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.customer.is_none() && self.competitor.is_none()
    }

    pub fn get(&self, territory: Territory) -> Option<&TerritoryGroup> {
        match territory {
            Territory::Company => self.company.as_ref(),
            Territory::Customer => self.customer.as_ref(),
            Territory::Competitor => self.competitor.as_ref(),
        }
    }
}

/// One synthesis opportunity with its scoring flattened
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub title: String,
    pub overall_score: f64,
}

/// The newest synthesis output for a session
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutput {
    pub created_at: i64,
    pub opportunities: Vec<Opportunity>,
}
