//! Context aggregator
//!
//! Pulls the per-request context together from the store: the merged
//! client context, mapped territory insights, the newest synthesis output,
//! and the user's personal profile. Reads are independent and read-only,
//! so they run concurrently where it helps.

use serde::Deserialize;
use sessionstore::SessionStatus;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{
    ClientContext, InsightEntry, Opportunity, PersonalProfile, StrategicFocus, SynthesisOutput, Territory,
    TerritoryGroup, TerritoryInsights,
};
use crate::persona::PersonaId;
use crate::store::{StoreError, StoreHandle};

/// Errors from context aggregation
#[derive(Debug, Error)]
pub enum ContextError {
    /// The organization profile is a hard precondition for any session
    #[error("Organization profile not found: {0}")]
    OrgProfileNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Malformed stored record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Stored synthesis opportunity shape (nested scoring)
#[derive(Debug, Deserialize)]
struct StoredOpportunity {
    title: String,
    scoring: StoredScoring,
}

#[derive(Debug, Deserialize)]
struct StoredScoring {
    impact: f64,
    feasibility: f64,
    urgency: f64,
}

/// Aggregates context reads over the store handle
#[derive(Clone)]
pub struct ContextAggregator {
    store: StoreHandle,
}

impl ContextAggregator {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Build the merged client context for an organization
    ///
    /// The organization profile must exist; the intake record and the
    /// personal profile are optional fallbacks. Merge rule per field:
    /// organization record wins, else intake record, else `None`.
    pub async fn load_client_context(
        &self,
        org_id: &str,
        user_id: Option<&str>,
    ) -> Result<ClientContext, ContextError> {
        let (org, intake) = tokio::join!(self.store.get_org_profile(org_id), self.store.latest_intake(org_id));
        let org = org?.ok_or_else(|| ContextError::OrgProfileNotFound(org_id.to_string()))?;
        let intake = intake?;

        debug!(%org_id, has_intake = intake.is_some(), "load_client_context: records loaded");

        let personal_profile = match user_id {
            Some(user_id) => self.load_personal_profile(user_id, org_id).await?,
            None => None,
        };

        let pick = |org_field: Option<String>, intake_field: Option<String>| org_field.or(intake_field);
        let intake = intake.unwrap_or_else(|| sessionstore::IntakeRecord::new(org_id));

        let focus_str = pick(org.strategic_focus, intake.strategic_focus);
        let strategic_focus = focus_str.as_deref().and_then(StrategicFocus::parse);
        if strategic_focus.is_none()
            && let Some(raw) = focus_str.as_deref()
        {
            warn!(%raw, "load_client_context: unrecognized strategic focus, dropping");
        }

        let persona = pick(org.persona, intake.persona).as_deref().and_then(PersonaId::parse);

        Ok(ClientContext {
            org_id: org.org_id,
            company_name: org.company_name,
            industry: pick(org.industry, intake.industry),
            company_size: pick(org.company_size, intake.company_size),
            strategic_focus,
            pain_points: pick(org.pain_points, intake.pain_points),
            prior_attempts: pick(org.prior_attempts, intake.prior_attempts),
            target_outcomes: pick(org.target_outcomes, intake.target_outcomes),
            success_metrics: if org.success_metrics.is_empty() {
                intake.success_metrics
            } else {
                org.success_metrics
            },
            persona,
            personal_profile,
        })
    }

    /// Mapped territory insights for a session, grouped by territory
    ///
    /// Rows whose status is not `mapped` never reach this function (the
    /// store filters them); question/answer order is insertion order.
    pub async fn load_territory_insights(&self, session_id: &str) -> Result<TerritoryInsights, ContextError> {
        let rows = self.store.mapped_insights(session_id).await?;

        let mut insights = TerritoryInsights::default();
        for row in rows {
            let Some(territory) = Territory::parse(&row.territory) else {
                warn!(territory = %row.territory, "load_territory_insights: unknown territory tag, skipping");
                continue;
            };
            let slot = match territory {
                Territory::Company => &mut insights.company,
                Territory::Customer => &mut insights.customer,
                Territory::Competitor => &mut insights.competitor,
            };
            let group = slot.get_or_insert_with(|| TerritoryGroup {
                territory,
                area: row.area.clone(),
                entries: Vec::new(),
            });
            group.entries.push(InsightEntry {
                question: row.question,
                answer: row.answer,
            });
        }

        Ok(insights)
    }

    /// The single newest synthesis output for a session, if any
    ///
    /// Nested scoring is flattened to one `overall_score` per opportunity.
    pub async fn load_synthesis_output(&self, session_id: &str) -> Result<Option<SynthesisOutput>, ContextError> {
        let Some(record) = self.store.latest_synthesis(session_id).await? else {
            return Ok(None);
        };

        let stored: Vec<StoredOpportunity> = serde_json::from_str(&record.opportunities_json)?;
        let opportunities = stored
            .into_iter()
            .map(|o| Opportunity {
                title: o.title,
                overall_score: (o.scoring.impact + o.scoring.feasibility + o.scoring.urgency) / 3.0,
            })
            .collect();

        Ok(Some(SynthesisOutput {
            created_at: record.created_at,
            opportunities,
        }))
    }

    /// The user's personal profile, if a completed profiling session exists
    ///
    /// Looks at the newest profiling session only; an incomplete newest
    /// session means no profile, even if an older completed one exists.
    pub async fn load_personal_profile(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<Option<PersonalProfile>, ContextError> {
        let Some(session) = self.store.latest_profiling(user_id, org_id).await? else {
            return Ok(None);
        };
        if session.status != SessionStatus::Completed {
            debug!(session_id = %session.id, "load_personal_profile: newest profiling session not completed");
            return Ok(None);
        }
        let Some(profile_json) = session.profile_json else {
            return Ok(None);
        };
        let profile: PersonalProfile = serde_json::from_str(&profile_json)?;
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::spawn_store;
    use sessionstore::{IntakeRecord, OrgProfile, SessionKind, SessionRow, SessionStore, SynthesisRecord, TerritoryInsightRow};

    async fn aggregator_with(setup: impl FnOnce(&SessionStore)) -> ContextAggregator {
        let store = SessionStore::open_in_memory().unwrap();
        setup(&store);
        ContextAggregator::new(spawn_store(store))
    }

    #[tokio::test]
    async fn test_missing_org_profile_is_fatal() {
        let agg = aggregator_with(|_| {}).await;
        let err = agg.load_client_context("org-1", None).await.unwrap_err();
        assert!(matches!(err, ContextError::OrgProfileNotFound(_)));
    }

    #[tokio::test]
    async fn test_merge_org_wins_intake_fills() {
        let agg = aggregator_with(|store| {
            let mut org = OrgProfile::new("org-1", "Acme");
            org.industry = Some("manufacturing".to_string());
            org.strategic_focus = Some("growth".to_string());
            store.upsert_org_profile(&org).unwrap();

            let mut intake = IntakeRecord::new("org-1");
            intake.industry = Some("logistics".to_string()); // loses to org
            intake.pain_points = Some("Flat pipeline".to_string()); // fills the gap
            store.insert_intake_record(&intake).unwrap();
        })
        .await;

        let ctx = agg.load_client_context("org-1", None).await.unwrap();
        assert_eq!(ctx.company_name, "Acme");
        assert_eq!(ctx.industry.as_deref(), Some("manufacturing"));
        assert_eq!(ctx.pain_points.as_deref(), Some("Flat pipeline"));
        assert_eq!(ctx.strategic_focus, Some(StrategicFocus::Growth));
        assert!(ctx.focus_description().is_some());
        assert!(ctx.target_outcomes.is_none());
    }

    #[tokio::test]
    async fn test_absent_intake_is_not_an_error() {
        let agg = aggregator_with(|store| {
            store.upsert_org_profile(&OrgProfile::new("org-1", "Acme")).unwrap();
        })
        .await;

        let ctx = agg.load_client_context("org-1", None).await.unwrap();
        assert!(ctx.industry.is_none());
        assert!(ctx.personal_profile.is_none());
    }

    #[tokio::test]
    async fn test_territory_grouping() {
        let agg = aggregator_with(|store| {
            let mut a = TerritoryInsightRow::mapped("s-1", "customer", "Churn", "Why leave?", "Pricing");
            a.created_at = 100;
            let mut b = TerritoryInsightRow::mapped("s-1", "customer", "Churn", "Who stays?", "Enterprise");
            b.created_at = 200;
            let mut c = TerritoryInsightRow::mapped("s-1", "company", "Capabilities", "Core strength?", "Service");
            c.created_at = 300;
            store.insert_territory_insight(&a).unwrap();
            store.insert_territory_insight(&b).unwrap();
            store.insert_territory_insight(&c).unwrap();
        })
        .await;

        let insights = agg.load_territory_insights("s-1").await.unwrap();
        assert!(!insights.is_empty());
        let customer = insights.customer.unwrap();
        assert_eq!(customer.area, "Churn");
        assert_eq!(customer.entries.len(), 2);
        assert_eq!(customer.entries[0].question, "Why leave?");
        assert!(insights.competitor.is_none());
    }

    #[tokio::test]
    async fn test_synthesis_flattening_and_absence() {
        let agg = aggregator_with(|store| {
            let json = r#"[{"title":"Expand EU","scoring":{"impact":9.0,"feasibility":6.0,"urgency":3.0}}]"#;
            store.insert_synthesis(&SynthesisRecord::new("s-1", json)).unwrap();
        })
        .await;

        let output = agg.load_synthesis_output("s-1").await.unwrap().unwrap();
        assert_eq!(output.opportunities.len(), 1);
        assert_eq!(output.opportunities[0].title, "Expand EU");
        assert!((output.opportunities[0].overall_score - 6.0).abs() < f64::EPSILON);

        assert!(agg.load_synthesis_output("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_gated_on_completed_status() {
        let agg = aggregator_with(|store| {
            let mut row =
                SessionRow::new("org-1", Some("user-1".to_string()), SessionKind::Profiling, "{}".to_string());
            row.profile_json = Some(r#"{"role":"VP Product"}"#.to_string());
            store.create_session(&row).unwrap();
        })
        .await;

        // Newest profiling session is still active: no profile.
        assert!(agg.load_personal_profile("user-1", "org-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_loaded_when_completed() {
        let agg = aggregator_with(|store| {
            let mut row =
                SessionRow::new("org-1", Some("user-1".to_string()), SessionKind::Profiling, "{}".to_string());
            row.profile_json = Some(r#"{"role":"VP Product","decisionMaking":"data-driven"}"#.to_string());
            let id = row.id.clone();
            store.create_session(&row).unwrap();
            store.set_session_status(&id, SessionStatus::Completed).unwrap();
        })
        .await;

        let profile = agg.load_personal_profile("user-1", "org-1").await.unwrap().unwrap();
        assert_eq!(profile.role.as_deref(), Some("VP Product"));
        assert_eq!(profile.decision_making.as_deref(), Some("data-driven"));
    }
}
