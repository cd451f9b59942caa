//! Prompt composers
//!
//! Each prompt is assembled from an ordered list of section builders and
//! joined by a single renderer, so order and presence can be asserted per
//! section. A built document is immutable; nothing mutates it mid-request.

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::sections;
use crate::context::ClientContext;
use crate::persona;
use crate::session::{SessionState, suggest_next_focus, summarize};

/// Status of a profiling conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfilingStatus {
    #[default]
    InProgress,
    /// The next reply must be the terminal one carrying the marker
    AwaitingSummary,
}

/// Progress of the intake conversation through the five dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfilingState {
    pub status: ProfilingStatus,
    /// Index of the dimension currently being explored (may reach 5)
    pub dimension_index: usize,
    /// Completion flags, one per [`sections::INTAKE_DIMENSIONS`] entry
    pub dimensions_complete: [bool; 5],
}

impl ProfilingState {
    pub fn completed_dimensions(&self) -> usize {
        self.dimensions_complete.iter().filter(|c| **c).count()
    }
}

/// Join non-empty sections with a blank line, preserving order
fn render_document(sections: Vec<Option<String>>) -> String {
    sections
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a static template against a view, falling back to empty on error
///
/// Escaping is disabled: these documents are plain text for a model, not
/// HTML.
fn render_template<T: Serialize>(name: &str, template: &str, data: &T) -> String {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    match hbs.render_template(template, data) {
        Ok(text) => text,
        Err(e) => {
            warn!(%name, error = %e, "Template render failed");
            String::new()
        }
    }
}

// === Coaching prompt sections, in document order ===

fn identity_section() -> String {
    sections::CORE_IDENTITY.to_string()
}

#[derive(Serialize)]
struct ClientContextView<'a> {
    company_name: &'a str,
    industry: Option<&'a str>,
    company_size: Option<&'a str>,
    pain_points: Option<&'a str>,
    target_outcomes: Option<&'a str>,
    success_metrics: &'a [String],
}

const CLIENT_CONTEXT_TMPL: &str = "\
## Client context
Company: {{company_name}}
{{#if industry}}Industry: {{industry}}
{{/if}}{{#if company_size}}Size: {{company_size}}
{{/if}}{{#if pain_points}}Pain points: {{pain_points}}
{{/if}}{{#if target_outcomes}}Target outcomes: {{target_outcomes}}
{{/if}}{{#if success_metrics}}Success metrics:
{{#each success_metrics}}- {{this}}
{{/each}}{{/if}}";

fn client_context_section(context: &ClientContext) -> String {
    let view = ClientContextView {
        company_name: &context.company_name,
        industry: context.industry.as_deref(),
        company_size: context.company_size.as_deref(),
        pain_points: context.pain_points.as_deref(),
        target_outcomes: context.target_outcomes.as_deref(),
        success_metrics: &context.success_metrics,
    };
    render_template("client-context", CLIENT_CONTEXT_TMPL, &view)
        .trim_end()
        .to_string()
}

fn industry_section(context: &ClientContext) -> Option<String> {
    context.industry.as_deref().map(sections::industry_guidance)
}

fn focus_section(context: &ClientContext) -> Option<String> {
    context.strategic_focus.map(sections::focus_guidance)
}

fn recovery_section(context: &ClientContext) -> Option<String> {
    context.prior_attempts.as_deref().map(sections::recovery_guidance)
}

fn current_state_section(state: &SessionState) -> String {
    format!(
        "## Current state\nPhase: {}\n{}\nStrategic bets captured: {}",
        state.current_phase,
        summarize(state).render(),
        state.strategic_bets.len(),
    )
}

fn next_focus_section(state: &SessionState) -> String {
    format!("## Suggested next focus\n{}", suggest_next_focus(state))
}

fn tone_section(context: &ClientContext, state: &SessionState) -> String {
    let mut text = sections::TONE_GUIDELINES.to_string();
    if let Some(id) = context.persona {
        let overlay = persona::section(id);
        if !overlay.is_empty() {
            text.push('\n');
            text.push_str(&overlay);
        }
        let guidance = persona::phase_guidance(id, state.current_phase);
        if !guidance.is_empty() {
            text.push('\n');
            text.push_str(guidance);
        }
    }
    text
}

fn response_format_section() -> String {
    sections::RESPONSE_FORMAT.to_string()
}

/// Build the per-turn coaching instruction document
///
/// Section order is load-bearing and fixed; the three conditional sections
/// (industry, focus, transformation history) are the only ones that may be
/// absent.
pub fn build_coaching_prompt(context: &ClientContext, state: &SessionState) -> String {
    render_document(vec![
        Some(identity_section()),
        Some(client_context_section(context)),
        industry_section(context),
        focus_section(context),
        recovery_section(context),
        Some(sections::RESEARCH_PLAYBOOK.to_string()),
        Some(sections::CANVAS_FRAMEWORK.to_string()),
        Some(sections::BET_FORMAT.to_string()),
        Some(current_state_section(state)),
        Some(next_focus_section(state)),
        Some(tone_section(context, state)),
        Some(response_format_section()),
    ])
}

// === Intake prompt ===

fn intake_known_context_section(context: &ClientContext) -> String {
    let mut known = vec![format!("- Company: {}", context.company_name)];
    if let Some(industry) = &context.industry {
        known.push(format!("- Industry: {industry}"));
    }
    if let Some(size) = &context.company_size {
        known.push(format!("- Size: {size}"));
    }
    if let Some(focus) = context.strategic_focus {
        known.push(format!("- Declared focus: {}", focus.description()));
    }
    format!(
        "## Organization context (already known - do not re-ask any of this)\n{}",
        known.join("\n")
    )
}

fn intake_checklist_section(profiling: &ProfilingState) -> String {
    let mut lines = Vec::with_capacity(sections::INTAKE_DIMENSIONS.len());
    for (i, (key, probe)) in sections::INTAKE_DIMENSIONS.iter().enumerate() {
        let status = if profiling.dimensions_complete[i] {
            "done"
        } else if i == profiling.dimension_index {
            "current"
        } else {
            "pending"
        };
        lines.push(format!("{}. [{status}] {key}: {probe}", i + 1));
    }
    format!(
        "## Dimensions to cover, in order\n{}\n\nPacing: spend at most two exchanges on any one \
dimension before moving to the next, even if it feels incomplete. Circle back only if the \
person volunteers more.",
        lines.join("\n")
    )
}

fn intake_completion_section(profiling: &ProfilingState) -> String {
    // Three mutually exclusive variants, evaluated in this priority order.
    if profiling.status == ProfilingStatus::AwaitingSummary {
        format!(
            "## Final turn - mandatory\nThis reply must end the profiling conversation. Thank them in \
one or two sentences, then emit the completion marker. {}\nThe fenced block must be the literal \
last content of your reply; nothing may follow it.",
            sections::COMPLETION_MARKER_SCHEMA
        )
    } else if profiling.dimension_index >= 5 && profiling.completed_dimensions() >= 4 {
        format!(
            "## Wrap up now\nYou have covered the dimensions. Close the conversation this turn: thank \
them briefly, then emit the completion marker. {}\nThe fenced block must be the literal last \
content of your reply; nothing may follow it.",
            sections::COMPLETION_MARKER_SCHEMA
        )
    } else {
        format!(
            "## Completion (not yet)\nDo not end the conversation or emit any marker this turn. When \
every dimension has been covered, your final reply will end with a completion marker. {}",
            sections::COMPLETION_MARKER_SCHEMA
        )
    }
}

/// Build the instruction document for the initial profiling conversation
pub fn build_intake_prompt(context: &ClientContext, profiling: &ProfilingState, user_name: Option<&str>) -> String {
    let name_line = user_name.map(|name| format!("You are speaking with {name}."));
    render_document(vec![
        Some(sections::INTAKE_GUARDRAILS.to_string()),
        name_line,
        Some(intake_known_context_section(context)),
        Some(intake_checklist_section(profiling)),
        Some(intake_completion_section(profiling)),
    ])
}

// === Opening messages ===

#[derive(Serialize)]
struct OpeningView<'a> {
    name: Option<&'a str>,
    company: &'a str,
    pillar_pct: u32,
    next_focus: &'a str,
}

const WELCOME_BACK_TMPL: &str = "\
Welcome back{{#if name}}, {{name}}{{/if}}. Since we last spoke you have completed {{pillar_pct}}% \
of your research pillars for {{company}}.

Where I suggest we pick up: {{next_focus}}";

const FRESH_OPENING_TMPL: &str = "\
Hello{{#if name}} {{name}}{{/if}}, I'm your strategy coach. Over our sessions we'll work through \
a four-phase method - Discovery, Research, Synthesis, Planning - and turn what you learn into a \
small set of testable strategic bets for {{company}}.

We start with discovery. **What feels most uncertain about {{company}}'s strategy right now?**";

/// Deterministic opening message for a session
///
/// Resuming with existing history produces a welcome-back message whose
/// percentage comes straight from the three pillar-completion booleans
/// (not the weighted calculator). Anything else produces the fresh
/// greeting, which ends in exactly one bolded open question and never
/// references resumption.
pub fn generate_opening_message(
    context: &ClientContext,
    state: &SessionState,
    user_name: Option<&str>,
    is_resuming: bool,
) -> String {
    if is_resuming && state.total_message_count > 0 {
        let completed = state.research_pillars.completed_count();
        let pillar_pct = (completed as f64 / 3.0 * 100.0).round() as u32;
        let view = OpeningView {
            name: user_name,
            company: &context.company_name,
            pillar_pct,
            next_focus: suggest_next_focus(state),
        };
        return render_template("welcome-back", WELCOME_BACK_TMPL, &view);
    }

    let view = OpeningView {
        name: user_name,
        company: &context.company_name,
        pillar_pct: 0,
        next_focus: "",
    };
    render_template("fresh-opening", FRESH_OPENING_TMPL, &view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StrategicFocus;
    use crate::persona::PersonaId;
    use crate::session::{PillarKey, StateUpdate, apply_update};

    fn context() -> ClientContext {
        ClientContext {
            org_id: "org-1".to_string(),
            company_name: "Acme Industrial".to_string(),
            industry: Some("manufacturing".to_string()),
            company_size: Some("200-500".to_string()),
            strategic_focus: Some(StrategicFocus::Growth),
            pain_points: Some("Flat pipeline".to_string()),
            prior_attempts: Some("2022 digital transformation stalled".to_string()),
            target_outcomes: Some("Double ARR in 3 years".to_string()),
            success_metrics: vec!["ARR growth".to_string()],
            persona: Some(PersonaId::Analyst),
            personal_profile: None,
        }
    }

    fn bare_context() -> ClientContext {
        ClientContext {
            org_id: "org-1".to_string(),
            company_name: "Acme Industrial".to_string(),
            industry: None,
            company_size: None,
            strategic_focus: None,
            pain_points: None,
            prior_attempts: None,
            target_outcomes: None,
            success_metrics: vec![],
            persona: None,
            personal_profile: None,
        }
    }

    #[test]
    fn test_coaching_prompt_section_order() {
        let state = SessionState::new();
        let prompt = build_coaching_prompt(&context(), &state);

        let positions: Vec<usize> = [
            sections::CORE_IDENTITY,
            "## Client context",
            "## Industry lens",
            "## Strategic focus",
            "## Transformation history",
            "## Research playbook",
            "## Strategy canvas",
            "## Strategic bet format",
            "## Current state",
            "## Suggested next focus",
            "## Tone",
            "## Response format",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing section: {needle}")))
        .collect();

        for pair in positions.windows(2) {
            assert!(pair[0] < pair[1], "sections out of order");
        }
    }

    #[test]
    fn test_coaching_prompt_embeds_summary_verbatim() {
        let state = apply_update(
            &SessionState::new(),
            &[StateUpdate::StartPillar(PillarKey::MacroMarket)],
        );
        let prompt = build_coaching_prompt(&context(), &state);
        assert!(prompt.contains(&summarize(&state).render()));
        assert!(prompt.contains(suggest_next_focus(&state)));
    }

    #[test]
    fn test_conditional_sections_absent_without_data() {
        let prompt = build_coaching_prompt(&bare_context(), &SessionState::new());
        assert!(!prompt.contains("## Industry lens"));
        assert!(!prompt.contains("## Strategic focus"));
        assert!(!prompt.contains("## Transformation history"));
        // The static sections still appear.
        assert!(prompt.contains("## Research playbook"));
    }

    #[test]
    fn test_persona_overlay_in_tone_section() {
        let prompt = build_coaching_prompt(&context(), &SessionState::new());
        assert!(prompt.contains("Analyst"));

        let without = build_coaching_prompt(&bare_context(), &SessionState::new());
        assert!(!without.contains("Analyst"));
    }

    #[test]
    fn test_intake_prompt_default_variant() {
        let prompt = build_intake_prompt(&context(), &ProfilingState::default(), Some("Dana"));
        assert!(prompt.contains("Dana"));
        assert!(prompt.contains("do not re-ask"));
        assert!(prompt.contains("## Completion (not yet)"));
        assert!(!prompt.contains("## Final turn"));
        assert!(!prompt.contains("## Wrap up now"));
    }

    #[test]
    fn test_intake_prompt_wrap_up_variant() {
        let profiling = ProfilingState {
            status: ProfilingStatus::InProgress,
            dimension_index: 5,
            dimensions_complete: [true, true, true, true, false],
        };
        let prompt = build_intake_prompt(&context(), &profiling, None);
        assert!(prompt.contains("## Wrap up now"));
        assert!(!prompt.contains("## Final turn"));
        assert!(!prompt.contains("## Completion (not yet)"));
    }

    #[test]
    fn test_intake_prompt_awaiting_summary_wins() {
        // Awaiting-summary takes priority even when wrap-up would also match.
        let profiling = ProfilingState {
            status: ProfilingStatus::AwaitingSummary,
            dimension_index: 5,
            dimensions_complete: [true; 5],
        };
        let prompt = build_intake_prompt(&context(), &profiling, None);
        assert!(prompt.contains("## Final turn"));
        assert!(!prompt.contains("## Wrap up now"));
        assert!(!prompt.contains("## Completion (not yet)"));
        assert!(prompt.contains("literal last content"));
    }

    #[test]
    fn test_intake_checklist_marks_current_dimension() {
        let profiling = ProfilingState {
            status: ProfilingStatus::InProgress,
            dimension_index: 2,
            dimensions_complete: [true, true, false, false, false],
        };
        let prompt = build_intake_prompt(&context(), &profiling, None);
        assert!(prompt.contains("[done] role"));
        assert!(prompt.contains("[done] objectives"));
        assert!(prompt.contains("[current] leadership style"));
        assert!(prompt.contains("[pending] experience"));
    }

    #[test]
    fn test_opening_fresh_never_mentions_resumption() {
        let message = generate_opening_message(&context(), &SessionState::new(), Some("Dana"), false);
        assert!(!message.contains("Welcome back"));
        assert!(message.contains("Dana"));
        // Exactly one bolded question at the end.
        assert_eq!(message.matches("**").count(), 2);
        assert!(message.trim_end().ends_with("?**"));
    }

    #[test]
    fn test_opening_resuming_without_history_is_fresh() {
        let message = generate_opening_message(&context(), &SessionState::new(), None, true);
        assert!(!message.contains("Welcome back"));
    }

    #[test]
    fn test_opening_resuming_uses_raw_pillar_percentage() {
        let mut state = SessionState::new();
        state.total_message_count = 12;
        state.research_pillars.macro_market.completed = true;
        // 1 of 3 pillars: 33%, not the weighted calculator's number.
        let message = generate_opening_message(&context(), &state, None, true);
        assert!(message.contains("Welcome back"));
        assert!(message.contains("33%"));
        assert!(message.contains(suggest_next_focus(&state)));
    }
}
