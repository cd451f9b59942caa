//! Pure state transition engine
//!
//! `apply_update` is the only way session state advances. It never mutates
//! its input; callers hold a snapshot, apply updates, and persist the
//! result. Two concurrent read-modify-write cycles against the same
//! session can therefore lose one update (last write wins) - serialization
//! is the store layer's job, not this engine's.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::state::{CanvasSection, Phase, PillarKey, SessionState, StrategicBet};

/// One incremental update; any subset may be applied in a single call
#[derive(Debug, Clone)]
pub enum StateUpdate {
    SetPhase(Phase),
    StartPillar(PillarKey),
    CompletePillar(PillarKey),
    AddPillarInsight { pillar: PillarKey, insight: String },
    CompleteCanvasSection(CanvasSection),
    AddStrategicBet {
        belief: String,
        implication: String,
        exploration: String,
        success_metric: String,
        pillar_source: Option<PillarKey>,
    },
    AddKeyInsight(String),
    IncrementMessageCount,
}

/// Apply a batch of updates to a snapshot, returning the new state
///
/// The input is deep-copied before any mutation. `last_activity_at` is
/// refreshed unconditionally, even for an empty batch. No cross-field
/// validation happens here: completing a pillar does not force-start it.
pub fn apply_update(state: &SessionState, updates: &[StateUpdate]) -> SessionState {
    let mut next = state.clone();

    for update in updates {
        debug!(?update, "apply_update: applying");
        match update {
            StateUpdate::SetPhase(phase) => {
                next.current_phase = *phase;
            }
            StateUpdate::StartPillar(key) => {
                let pillar = next.research_pillars.get_mut(*key);
                pillar.started = true;
                pillar.last_explored_at = Some(Utc::now());
            }
            StateUpdate::CompletePillar(key) => {
                let pillar = next.research_pillars.get_mut(*key);
                pillar.completed = true;
                pillar.last_explored_at = Some(Utc::now());
            }
            StateUpdate::AddPillarInsight { pillar, insight } => {
                let pillar = next.research_pillars.get_mut(*pillar);
                pillar.insights.push(insight.clone());
                pillar.last_explored_at = Some(Utc::now());
            }
            StateUpdate::CompleteCanvasSection(section) => {
                next.canvas_progress.set(*section, true);
            }
            StateUpdate::AddStrategicBet {
                belief,
                implication,
                exploration,
                success_metric,
                pillar_source,
            } => {
                next.strategic_bets.push(StrategicBet {
                    id: Uuid::now_v7().to_string(),
                    belief: belief.clone(),
                    implication: implication.clone(),
                    exploration: exploration.clone(),
                    success_metric: success_metric.clone(),
                    created_at: Utc::now(),
                    pillar_source: *pillar_source,
                });
            }
            StateUpdate::AddKeyInsight(insight) => {
                next.key_insights.push(insight.clone());
            }
            StateUpdate::IncrementMessageCount => {
                next.total_message_count += 1;
            }
        }
    }

    next.last_activity_at = Utc::now();
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update_never_mutates_input() {
        let state = SessionState::new();
        let before = state.clone();

        let next = apply_update(&state, &[StateUpdate::StartPillar(PillarKey::MacroMarket)]);

        assert_eq!(state, before);
        assert!(next.research_pillars.macro_market.started);
        assert!(!state.research_pillars.macro_market.started);
    }

    #[test]
    fn test_empty_batch_still_refreshes_activity() {
        let mut state = SessionState::new();
        state.last_activity_at = chrono::DateTime::from_timestamp(0, 0).unwrap();

        let next = apply_update(&state, &[]);
        assert!(next.last_activity_at > state.last_activity_at);
        assert_eq!(next.research_pillars, state.research_pillars);
    }

    #[test]
    fn test_complete_without_start_leaves_started_false() {
        // As-built behavior: completion does not imply started.
        let state = SessionState::new();
        let next = apply_update(&state, &[StateUpdate::CompletePillar(PillarKey::Customer)]);

        assert!(next.research_pillars.customer.completed);
        assert!(!next.research_pillars.customer.started);
    }

    #[test]
    fn test_mixed_batch_applies_in_order() {
        let state = SessionState::new();
        let next = apply_update(
            &state,
            &[
                StateUpdate::SetPhase(Phase::Research),
                StateUpdate::StartPillar(PillarKey::MacroMarket),
                StateUpdate::AddPillarInsight {
                    pillar: PillarKey::MacroMarket,
                    insight: "Regulation is tightening".to_string(),
                },
                StateUpdate::CompleteCanvasSection(CanvasSection::MarketReality),
                StateUpdate::AddKeyInsight("Distribution is the bottleneck".to_string()),
                StateUpdate::IncrementMessageCount,
                StateUpdate::IncrementMessageCount,
            ],
        );

        assert_eq!(next.current_phase, Phase::Research);
        assert!(next.research_pillars.macro_market.started);
        assert_eq!(next.research_pillars.macro_market.insights.len(), 1);
        assert!(next.canvas_progress.market_reality);
        assert_eq!(next.key_insights.len(), 1);
        assert_eq!(next.total_message_count, 2);
    }

    #[test]
    fn test_add_strategic_bet_assigns_fresh_id() {
        let state = SessionState::new();
        let bet = StateUpdate::AddStrategicBet {
            belief: "Mid-market wants self-serve".to_string(),
            implication: "Sales-led motion caps growth".to_string(),
            exploration: "Ship a PLG funnel experiment".to_string(),
            success_metric: "20% of new ARR self-serve".to_string(),
            pillar_source: Some(PillarKey::Customer),
        };

        let next = apply_update(&state, &[bet.clone(), bet]);
        assert_eq!(next.strategic_bets.len(), 2);
        assert_ne!(next.strategic_bets[0].id, next.strategic_bets[1].id);
        assert_eq!(next.strategic_bets[0].pillar_source, Some(PillarKey::Customer));
    }

    #[test]
    fn test_two_snapshots_can_lose_an_update() {
        // The documented lost-update race: both writers start from the same
        // snapshot; whichever persists last wins and the other's change is gone.
        let base = SessionState::new();

        let writer_a = apply_update(&base, &[StateUpdate::StartPillar(PillarKey::MacroMarket)]);
        let writer_b = apply_update(&base, &[StateUpdate::AddKeyInsight("lost?".to_string())]);

        // Simulated last-write-wins persistence.
        let persisted = writer_b.clone();

        assert!(writer_a.research_pillars.macro_market.started);
        assert!(!persisted.research_pillars.macro_market.started);
        assert_eq!(persisted.key_insights.len(), 1);
    }
}
