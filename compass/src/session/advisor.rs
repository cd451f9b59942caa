//! Next-focus advisor
//!
//! A first-match-wins decision procedure over a session snapshot. The
//! branch order is the contract: each condition is evaluated independently
//! on every call, and only ordering decides the outcome when several hold
//! at once.

use tracing::debug;

use super::state::{CanvasSection, Phase, SessionState};

/// Recommend the next coaching action for a session
///
/// Stateless and idempotent; the same snapshot always produces the same
/// recommendation regardless of call history.
pub fn suggest_next_focus(state: &SessionState) -> &'static str {
    let pillars = &state.research_pillars;

    // 1. Nothing started yet: always open with macro-market research.
    if state.no_pillar_started() {
        debug!("suggest_next_focus: no pillar started");
        return "Start your research with the macro-market pillar: map the forces reshaping your market before looking inward.";
    }

    // 2-6. Walk the pillars in methodology order.
    if pillars.macro_market.started && !pillars.macro_market.completed {
        return "Continue your macro-market research until you can name the two or three forces that matter most.";
    }
    if !pillars.customer.started {
        return "Begin the customer pillar: talk to the people who pay you and the people who stopped.";
    }
    if pillars.customer.started && !pillars.customer.completed {
        return "Keep going on the customer pillar; push past first answers to the underlying jobs and frustrations.";
    }
    if !pillars.colleague.started {
        return "Open the colleague pillar: gather what your own organization already believes about the strategy.";
    }
    if pillars.colleague.started && !pillars.colleague.completed {
        return "Finish the colleague pillar; reconcile the internal views you have collected so far.";
    }

    // 7. Research done but synthesis not yet captured.
    if state.all_pillars_completed() && !state.canvas_progress.strategic_synthesis {
        debug!("suggest_next_focus: pillars complete, synthesis pending");
        return "All three research pillars are complete. Move into synthesis: start pulling your findings onto the canvas.";
    }

    // 8. In synthesis or planning: point at the first open canvas section.
    if matches!(state.current_phase, Phase::Synthesis | Phase::Planning) {
        for section in CanvasSection::ALL {
            if !state.canvas_progress.get(section) {
                debug!(section = section.label(), "suggest_next_focus: open canvas section");
                return match section {
                    CanvasSection::MarketReality => {
                        "Capture the market-reality section of your canvas: the external facts your strategy must survive."
                    }
                    CanvasSection::CustomerInsights => {
                        "Fill in the customer-insights section of your canvas from your research findings."
                    }
                    CanvasSection::OrganizationalContext => {
                        "Document the organizational-context section: capabilities, constraints, and appetite for change."
                    }
                    CanvasSection::StrategicSynthesis => {
                        "Write the strategic-synthesis section: the few choices that follow from everything you have mapped."
                    }
                    CanvasSection::TeamContext => {
                        "Complete the team-context section: who carries each bet and what they need to succeed."
                    }
                };
            }
        }
    }

    // 9. Everything claimed done, or an off-path state: review and refine.
    "Review and refine: pressure-test your bets against the canvas and sharpen the weakest success metric."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::PillarKey;

    fn state() -> SessionState {
        SessionState::new()
    }

    #[test]
    fn test_unstarted_state_recommends_macro_market_regardless_of_phase() {
        for phase in [Phase::Discovery, Phase::Research, Phase::Synthesis, Phase::Planning] {
            let mut s = state();
            s.current_phase = phase;
            assert!(
                suggest_next_focus(&s).contains("macro-market"),
                "phase {phase} should still recommend macro-market"
            );
        }
    }

    #[test]
    fn test_pillar_walk_order() {
        let mut s = state();
        s.research_pillars.macro_market.started = true;
        assert!(suggest_next_focus(&s).contains("Continue your macro-market"));

        s.research_pillars.macro_market.completed = true;
        assert!(suggest_next_focus(&s).contains("Begin the customer pillar"));

        s.research_pillars.customer.started = true;
        assert!(suggest_next_focus(&s).contains("Keep going on the customer pillar"));

        s.research_pillars.customer.completed = true;
        assert!(suggest_next_focus(&s).contains("Open the colleague pillar"));

        s.research_pillars.colleague.started = true;
        assert!(suggest_next_focus(&s).contains("Finish the colleague pillar"));
    }

    #[test]
    fn test_all_pillars_complete_recommends_synthesis() {
        let mut s = state();
        for key in PillarKey::ALL {
            let p = s.research_pillars.get_mut(key);
            p.started = true;
            p.completed = true;
        }
        assert!(suggest_next_focus(&s).contains("Move into synthesis"));
    }

    #[test]
    fn test_synthesis_phase_walks_canvas_in_order() {
        let mut s = state();
        for key in PillarKey::ALL {
            let p = s.research_pillars.get_mut(key);
            p.started = true;
            p.completed = true;
        }
        s.current_phase = Phase::Synthesis;
        // strategic_synthesis set so branch 7 is skipped and the walk runs.
        s.canvas_progress.strategic_synthesis = true;

        assert!(suggest_next_focus(&s).contains("market-reality"));

        s.canvas_progress.market_reality = true;
        assert!(suggest_next_focus(&s).contains("customer-insights"));

        s.canvas_progress.customer_insights = true;
        assert!(suggest_next_focus(&s).contains("organizational-context"));

        s.canvas_progress.organizational_context = true;
        assert!(suggest_next_focus(&s).contains("team-context"));
    }

    #[test]
    fn test_fallback_when_everything_done() {
        let mut s = state();
        for key in PillarKey::ALL {
            let p = s.research_pillars.get_mut(key);
            p.started = true;
            p.completed = true;
        }
        for section in CanvasSection::ALL {
            s.canvas_progress.set(section, true);
        }
        s.current_phase = Phase::Planning;

        assert!(suggest_next_focus(&s).contains("Review and refine"));
    }

    #[test]
    fn test_idempotent() {
        let mut s = state();
        s.research_pillars.macro_market.started = true;
        let first = suggest_next_focus(&s);
        let second = suggest_next_focus(&s);
        assert_eq!(first, second);
    }
}
