//! Core SessionStore implementation

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::records::{
    IntakeRecord, OrgProfile, SessionKind, SessionRow, SessionStatus, SynthesisRecord, TerritoryInsightRow,
};
use crate::{Result, now_ms};

/// Ordering rank for the four coaching phases
///
/// Used only for the monotonic `highest_phase_reached` rule; the store does
/// not otherwise interpret phases.
fn phase_rank(phase: &str) -> Option<u8> {
    match phase {
        "discovery" => Some(0),
        "research" => Some(1),
        "synthesis" => Some(2),
        "planning" => Some(3),
        _ => None,
    }
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS org_profiles (
    org_id          TEXT PRIMARY KEY,
    company_name    TEXT NOT NULL,
    industry        TEXT,
    company_size    TEXT,
    strategic_focus TEXT,
    pain_points     TEXT,
    prior_attempts  TEXT,
    target_outcomes TEXT,
    success_metrics TEXT NOT NULL DEFAULT '[]',
    persona         TEXT,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS intake_records (
    id              TEXT PRIMARY KEY,
    org_id          TEXT NOT NULL,
    company_name    TEXT,
    industry        TEXT,
    company_size    TEXT,
    strategic_focus TEXT,
    pain_points     TEXT,
    prior_attempts  TEXT,
    target_outcomes TEXT,
    success_metrics TEXT NOT NULL DEFAULT '[]',
    persona         TEXT,
    created_at      INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_intake_org ON intake_records(org_id);

CREATE TABLE IF NOT EXISTS sessions (
    id                    TEXT PRIMARY KEY,
    org_id                TEXT NOT NULL,
    user_id               TEXT,
    kind                  TEXT NOT NULL,
    status                TEXT NOT NULL,
    phase                 TEXT NOT NULL,
    highest_phase_reached TEXT NOT NULL,
    state_json            TEXT NOT NULL,
    profile_json          TEXT,
    created_at            INTEGER NOT NULL,
    updated_at            INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_user_org ON sessions(user_id, org_id);

CREATE TABLE IF NOT EXISTS territory_insights (
    id          TEXT PRIMARY KEY,
    session_id  TEXT NOT NULL,
    territory   TEXT NOT NULL,
    area        TEXT NOT NULL,
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    status      TEXT NOT NULL,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_insights_session ON territory_insights(session_id, status);

CREATE TABLE IF NOT EXISTS synthesis_records (
    id                  TEXT PRIMARY KEY,
    session_id          TEXT NOT NULL,
    opportunities_json  TEXT NOT NULL,
    created_at          INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_synthesis_session ON synthesis_records(session_id);
"#;

/// The session store
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "Opened session store");
        Ok(Self { conn })
    }

    /// Open an in-memory store (tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        debug!("Opened in-memory session store");
        Ok(Self { conn })
    }

    // === Org profiles ===

    /// Insert or replace an organization profile
    pub fn upsert_org_profile(&self, profile: &OrgProfile) -> Result<()> {
        let metrics = serde_json::to_string(&profile.success_metrics)?;
        self.conn.execute(
            "INSERT INTO org_profiles
               (org_id, company_name, industry, company_size, strategic_focus, pain_points,
                prior_attempts, target_outcomes, success_metrics, persona, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(org_id) DO UPDATE SET
               company_name = excluded.company_name,
               industry = excluded.industry,
               company_size = excluded.company_size,
               strategic_focus = excluded.strategic_focus,
               pain_points = excluded.pain_points,
               prior_attempts = excluded.prior_attempts,
               target_outcomes = excluded.target_outcomes,
               success_metrics = excluded.success_metrics,
               persona = excluded.persona,
               updated_at = excluded.updated_at",
            params![
                profile.org_id,
                profile.company_name,
                profile.industry,
                profile.company_size,
                profile.strategic_focus,
                profile.pain_points,
                profile.prior_attempts,
                profile.target_outcomes,
                metrics,
                profile.persona,
                profile.created_at,
                profile.updated_at,
            ],
        )?;
        debug!(org_id = %profile.org_id, "Upserted org profile");
        Ok(())
    }

    /// Fetch an organization profile by org id
    pub fn get_org_profile(&self, org_id: &str) -> Result<Option<OrgProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT org_id, company_name, industry, company_size, strategic_focus, pain_points,
                        prior_attempts, target_outcomes, success_metrics, persona, created_at, updated_at
                 FROM org_profiles WHERE org_id = ?1",
                params![org_id],
                |row| {
                    Ok((
                        OrgProfile {
                            org_id: row.get(0)?,
                            company_name: row.get(1)?,
                            industry: row.get(2)?,
                            company_size: row.get(3)?,
                            strategic_focus: row.get(4)?,
                            pain_points: row.get(5)?,
                            prior_attempts: row.get(6)?,
                            target_outcomes: row.get(7)?,
                            success_metrics: Vec::new(),
                            persona: row.get(9)?,
                            created_at: row.get(10)?,
                            updated_at: row.get(11)?,
                        },
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((mut profile, metrics_json)) => {
                profile.success_metrics = serde_json::from_str(&metrics_json)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    // === Intake records ===

    /// Insert an onboarding intake record
    pub fn insert_intake_record(&self, record: &IntakeRecord) -> Result<()> {
        let metrics = serde_json::to_string(&record.success_metrics)?;
        self.conn.execute(
            "INSERT INTO intake_records
               (id, org_id, company_name, industry, company_size, strategic_focus, pain_points,
                prior_attempts, target_outcomes, success_metrics, persona, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.id,
                record.org_id,
                record.company_name,
                record.industry,
                record.company_size,
                record.strategic_focus,
                record.pain_points,
                record.prior_attempts,
                record.target_outcomes,
                metrics,
                record.persona,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    /// Newest intake record for an organization, if any
    pub fn latest_intake_for_org(&self, org_id: &str) -> Result<Option<IntakeRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, org_id, company_name, industry, company_size, strategic_focus, pain_points,
                        prior_attempts, target_outcomes, success_metrics, persona, created_at
                 FROM intake_records WHERE org_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![org_id],
                |row| {
                    Ok((
                        IntakeRecord {
                            id: row.get(0)?,
                            org_id: row.get(1)?,
                            company_name: row.get(2)?,
                            industry: row.get(3)?,
                            company_size: row.get(4)?,
                            strategic_focus: row.get(5)?,
                            pain_points: row.get(6)?,
                            prior_attempts: row.get(7)?,
                            target_outcomes: row.get(8)?,
                            success_metrics: Vec::new(),
                            persona: row.get(10)?,
                            created_at: row.get(11)?,
                        },
                        row.get::<_, String>(9)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((mut record, metrics_json)) => {
                record.success_metrics = serde_json::from_str(&metrics_json)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    // === Sessions ===

    /// Create a session row
    pub fn create_session(&self, row: &SessionRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions
               (id, org_id, user_id, kind, status, phase, highest_phase_reached,
                state_json, profile_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.id,
                row.org_id,
                row.user_id,
                row.kind.as_str(),
                row.status.as_str(),
                row.phase,
                row.highest_phase_reached,
                row.state_json,
                row.profile_json,
                row.created_at,
                row.updated_at,
            ],
        )?;
        debug!(session_id = %row.id, kind = %row.kind.as_str(), "Created session");
        Ok(())
    }

    /// Fetch a session row by id
    pub fn get_session(&self, id: &str) -> Result<Option<SessionRow>> {
        self.conn
            .query_row(
                "SELECT id, org_id, user_id, kind, status, phase, highest_phase_reached,
                        state_json, profile_json, created_at, updated_at
                 FROM sessions WHERE id = ?1",
                params![id],
                Self::map_session_row,
            )
            .optional()
            .map_err(StoreError::from)
    }

    /// Overwrite the opaque state blob (read-modify-write by the caller)
    pub fn update_session_state(&self, id: &str, state_json: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE sessions SET state_json = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, state_json, now_ms()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("session {id}")));
        }
        Ok(())
    }

    /// Set the session status
    pub fn set_session_status(&self, id: &str, status: SessionStatus) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE sessions SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), now_ms()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("session {id}")));
        }
        Ok(())
    }

    /// Attach embedded profile data to a (profiling) session
    pub fn set_session_profile(&self, id: &str, profile_json: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE sessions SET profile_json = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, profile_json, now_ms()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("session {id}")));
        }
        Ok(())
    }

    /// Overwrite the phase mirror column
    ///
    /// The mirror itself is not monotonic (an administrative path may move it
    /// backwards); `highest_phase_reached` only ever advances.
    pub fn set_session_phase(&self, id: &str, phase: &str) -> Result<()> {
        let new_rank = phase_rank(phase).ok_or_else(|| StoreError::UnknownPhase(phase.to_string()))?;

        let current_highest: Option<String> = self
            .conn
            .query_row(
                "SELECT highest_phase_reached FROM sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let current_highest = current_highest.ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;

        let highest = match phase_rank(&current_highest) {
            Some(rank) if rank >= new_rank => current_highest,
            _ => phase.to_string(),
        };

        self.conn.execute(
            "UPDATE sessions SET phase = ?2, highest_phase_reached = ?3, updated_at = ?4 WHERE id = ?1",
            params![id, phase, highest, now_ms()],
        )?;
        debug!(session_id = %id, %phase, %highest, "Set session phase");
        Ok(())
    }

    /// Newest profiling session for a user/org pair regardless of status
    ///
    /// The caller decides what an incomplete profiling session means; the
    /// store does not filter on status here.
    pub fn latest_profiling_session(&self, user_id: &str, org_id: &str) -> Result<Option<SessionRow>> {
        self.conn
            .query_row(
                "SELECT id, org_id, user_id, kind, status, phase, highest_phase_reached,
                        state_json, profile_json, created_at, updated_at
                 FROM sessions
                 WHERE user_id = ?1 AND org_id = ?2 AND kind = 'profiling'
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![user_id, org_id],
                Self::map_session_row,
            )
            .optional()
            .map_err(StoreError::from)
    }

    fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
        let kind_str: String = row.get(3)?;
        let status_str: String = row.get(4)?;
        Ok(SessionRow {
            id: row.get(0)?,
            org_id: row.get(1)?,
            user_id: row.get(2)?,
            kind: SessionKind::parse(&kind_str).unwrap_or(SessionKind::Coaching),
            status: SessionStatus::parse(&status_str).unwrap_or(SessionStatus::Active),
            phase: row.get(5)?,
            highest_phase_reached: row.get(6)?,
            state_json: row.get(7)?,
            profile_json: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    // === Territory insights ===

    /// Insert a territory insight row
    pub fn insert_territory_insight(&self, row: &TerritoryInsightRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO territory_insights
               (id, session_id, territory, area, question, answer, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                row.id,
                row.session_id,
                row.territory,
                row.area,
                row.question,
                row.answer,
                row.status,
                row.created_at,
            ],
        )?;
        Ok(())
    }

    /// All mapped insights for a session, in insertion order
    pub fn mapped_insights(&self, session_id: &str) -> Result<Vec<TerritoryInsightRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, territory, area, question, answer, status, created_at
             FROM territory_insights
             WHERE session_id = ?1 AND status = 'mapped'
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(TerritoryInsightRow {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    territory: row.get(2)?,
                    area: row.get(3)?,
                    question: row.get(4)?,
                    answer: row.get(5)?,
                    status: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // === Synthesis records ===

    /// Insert a synthesis record
    pub fn insert_synthesis(&self, record: &SynthesisRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO synthesis_records (id, session_id, opportunities_json, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.session_id, record.opportunities_json, record.created_at],
        )?;
        Ok(())
    }

    /// Newest synthesis record for a session, if any
    pub fn latest_synthesis(&self, session_id: &str) -> Result<Option<SynthesisRecord>> {
        self.conn
            .query_row(
                "SELECT id, session_id, opportunities_json, created_at
                 FROM synthesis_records WHERE session_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![session_id],
                |row| {
                    Ok(SynthesisRecord {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        opportunities_json: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::from)
    }
}
