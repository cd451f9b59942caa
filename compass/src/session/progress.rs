//! Progress calculator
//!
//! Pure percentage summary of a session snapshot. The rounding order is
//! load-bearing: `overall` is rounded from the unrounded raw components;
//! the two displayed components are rounded independently afterwards.

use super::state::SessionState;

/// Rounded percentage summary of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Weighted overall progress, 0-100
    pub overall: u8,
    /// Research pillar progress, 0-100
    pub research_progress: u8,
    /// Canvas completion progress, 0-100
    pub canvas_progress: u8,
}

impl ProgressSummary {
    /// The human-readable line embedded verbatim in the coaching prompt
    pub fn render(&self) -> String {
        format!(
            "Overall progress: {}% (research {}%, canvas {}%)",
            self.overall, self.research_progress, self.canvas_progress
        )
    }
}

/// Summarize a session snapshot
///
/// Pillar score: 1.0 completed, 0.5 started-but-not-completed, else 0.0.
/// `overall = round(raw_research * 0.5 + raw_canvas * 0.5)` computed from
/// the unrounded raws; rounding either component first changes results.
pub fn summarize(state: &SessionState) -> ProgressSummary {
    let pillar_sum: f64 = state.research_pillars.iter().map(|(_, p)| p.score()).sum();
    let raw_research = pillar_sum / 3.0 * 100.0;
    let raw_canvas = state.canvas_progress.completed_count() as f64 / 5.0 * 100.0;

    let overall = (raw_research * 0.5 + raw_canvas * 0.5).round() as u8;

    ProgressSummary {
        overall,
        research_progress: raw_research.round() as u8,
        canvas_progress: raw_canvas.round() as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{CanvasSection, PillarKey};
    use crate::session::transition::{StateUpdate, apply_update};
    use proptest::prelude::*;

    #[test]
    fn test_fresh_state_is_zero() {
        let summary = summarize(&SessionState::new());
        assert_eq!(summary.overall, 0);
        assert_eq!(summary.research_progress, 0);
        assert_eq!(summary.canvas_progress, 0);
    }

    #[test]
    fn test_single_started_pillar_rounding() {
        // raw_research = 16.667 -> research 17, overall round(8.333) = 8.
        let state = apply_update(
            &SessionState::new(),
            &[StateUpdate::StartPillar(PillarKey::MacroMarket)],
        );
        let summary = summarize(&state);

        assert_eq!(summary.research_progress, 17);
        assert_eq!(summary.canvas_progress, 0);
        assert_eq!(summary.overall, 8);
    }

    #[test]
    fn test_everything_complete_is_100() {
        let mut state = SessionState::new();
        for key in PillarKey::ALL {
            state.research_pillars.get_mut(key).completed = true;
        }
        for section in CanvasSection::ALL {
            state.canvas_progress.set(section, true);
        }

        let summary = summarize(&state);
        assert_eq!(summary.overall, 100);
        assert_eq!(summary.research_progress, 100);
        assert_eq!(summary.canvas_progress, 100);
    }

    #[test]
    fn test_summarize_is_pure() {
        let mut state = SessionState::new();
        state.research_pillars.customer.started = true;
        state.canvas_progress.market_reality = true;

        let a = summarize(&state);
        let b = summarize(&state);
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_format() {
        let mut state = SessionState::new();
        state.research_pillars.macro_market.completed = true;
        let summary = summarize(&state);

        assert_eq!(
            summary.render(),
            format!(
                "Overall progress: {}% (research {}%, canvas {}%)",
                summary.overall, summary.research_progress, summary.canvas_progress
            )
        );
    }

    proptest! {
        #[test]
        fn prop_overall_within_bounds(
            started in proptest::collection::vec(any::<bool>(), 3),
            completed in proptest::collection::vec(any::<bool>(), 3),
            canvas in proptest::collection::vec(any::<bool>(), 5),
        ) {
            let mut state = SessionState::new();
            for (i, key) in PillarKey::ALL.iter().enumerate() {
                state.research_pillars.get_mut(*key).started = started[i];
                state.research_pillars.get_mut(*key).completed = completed[i];
            }
            for (i, section) in CanvasSection::ALL.iter().enumerate() {
                state.canvas_progress.set(*section, canvas[i]);
            }

            let summary = summarize(&state);
            prop_assert!(summary.overall <= 100);
            prop_assert!(summary.research_progress <= 100);
            prop_assert!(summary.canvas_progress <= 100);
        }
    }
}
