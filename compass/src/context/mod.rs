//! Client context aggregation
//!
//! Loads and merges organization, onboarding, and session-scoped context
//! from the store into the shapes the prompt composer consumes.

mod aggregator;
mod types;

pub use aggregator::{ContextAggregator, ContextError};
pub use types::{
    ClientContext, InsightEntry, Opportunity, PersonalProfile, StrategicFocus, SynthesisOutput, Territory,
    TerritoryGroup, TerritoryInsights,
};
