//! Store actor and its handle
//!
//! One task owns the SQLite connection; all reads and writes flow through
//! its command channel, which also serializes read-modify-write cycles of
//! the session blob within this process.

use sessionstore::{
    IntakeRecord, OrgProfile, SessionRow, SessionStatus, SessionStore, SynthesisRecord, TerritoryInsightRow,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::messages::{StoreCommand, StoreError};

const COMMAND_BUFFER: usize = 64;

/// Spawn the store actor, returning its cloneable handle
pub fn spawn_store(store: SessionStore) -> StoreHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    tokio::spawn(run(store, rx));
    StoreHandle { tx }
}

async fn run(store: SessionStore, mut rx: mpsc::Receiver<StoreCommand>) {
    info!("Store actor started");
    while let Some(command) = rx.recv().await {
        match command {
            StoreCommand::UpsertOrgProfile { profile, reply } => {
                let _ = reply.send(store.upsert_org_profile(&profile).map_err(Into::into));
            }
            StoreCommand::GetOrgProfile { org_id, reply } => {
                let _ = reply.send(store.get_org_profile(&org_id).map_err(Into::into));
            }
            StoreCommand::InsertIntake { record, reply } => {
                let _ = reply.send(store.insert_intake_record(&record).map_err(Into::into));
            }
            StoreCommand::GetLatestIntake { org_id, reply } => {
                let _ = reply.send(store.latest_intake_for_org(&org_id).map_err(Into::into));
            }
            StoreCommand::CreateSession { row, reply } => {
                let _ = reply.send(store.create_session(&row).map_err(Into::into));
            }
            StoreCommand::GetSession { id, reply } => {
                let _ = reply.send(store.get_session(&id).map_err(Into::into));
            }
            StoreCommand::UpdateSessionState { id, state_json, reply } => {
                let _ = reply.send(store.update_session_state(&id, &state_json).map_err(Into::into));
            }
            StoreCommand::SetSessionStatus { id, status, reply } => {
                let _ = reply.send(store.set_session_status(&id, status).map_err(Into::into));
            }
            StoreCommand::SetSessionProfile { id, profile_json, reply } => {
                let _ = reply.send(store.set_session_profile(&id, &profile_json).map_err(Into::into));
            }
            StoreCommand::SetSessionPhase { id, phase, reply } => {
                let _ = reply.send(store.set_session_phase(&id, &phase).map_err(Into::into));
            }
            StoreCommand::LatestProfiling { user_id, org_id, reply } => {
                let _ = reply.send(store.latest_profiling_session(&user_id, &org_id).map_err(Into::into));
            }
            StoreCommand::InsertInsight { row, reply } => {
                let _ = reply.send(store.insert_territory_insight(&row).map_err(Into::into));
            }
            StoreCommand::MappedInsights { session_id, reply } => {
                let _ = reply.send(store.mapped_insights(&session_id).map_err(Into::into));
            }
            StoreCommand::InsertSynthesis { record, reply } => {
                let _ = reply.send(store.insert_synthesis(&record).map_err(Into::into));
            }
            StoreCommand::LatestSynthesis { session_id, reply } => {
                let _ = reply.send(store.latest_synthesis(&session_id).map_err(Into::into));
            }
            StoreCommand::Shutdown => {
                debug!("Store actor shutting down");
                break;
            }
        }
    }
    info!("Store actor stopped");
}

/// Cloneable async handle to the store actor
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreCommand,
    ) -> Result<T, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| {
            warn!("Store command channel closed");
            StoreError::ChannelClosed
        })?;
        rx.await.map_err(|_| StoreError::ChannelClosed)?
    }

    pub async fn upsert_org_profile(&self, profile: OrgProfile) -> Result<(), StoreError> {
        self.request(|reply| StoreCommand::UpsertOrgProfile { profile, reply }).await
    }

    pub async fn get_org_profile(&self, org_id: &str) -> Result<Option<OrgProfile>, StoreError> {
        let org_id = org_id.to_string();
        self.request(|reply| StoreCommand::GetOrgProfile { org_id, reply }).await
    }

    pub async fn insert_intake(&self, record: IntakeRecord) -> Result<(), StoreError> {
        self.request(|reply| StoreCommand::InsertIntake { record, reply }).await
    }

    pub async fn latest_intake(&self, org_id: &str) -> Result<Option<IntakeRecord>, StoreError> {
        let org_id = org_id.to_string();
        self.request(|reply| StoreCommand::GetLatestIntake { org_id, reply }).await
    }

    pub async fn create_session(&self, row: SessionRow) -> Result<(), StoreError> {
        self.request(|reply| StoreCommand::CreateSession { row, reply }).await
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<SessionRow>, StoreError> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::GetSession { id, reply }).await
    }

    pub async fn update_session_state(&self, id: &str, state_json: String) -> Result<(), StoreError> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::UpdateSessionState { id, state_json, reply })
            .await
    }

    pub async fn set_session_status(&self, id: &str, status: SessionStatus) -> Result<(), StoreError> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::SetSessionStatus { id, status, reply }).await
    }

    pub async fn set_session_profile(&self, id: &str, profile_json: String) -> Result<(), StoreError> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::SetSessionProfile { id, profile_json, reply })
            .await
    }

    /// Overwrite the phase mirror column (out-of-band administrative path)
    pub async fn set_session_phase(&self, id: &str, phase: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        let phase = phase.to_string();
        self.request(|reply| StoreCommand::SetSessionPhase { id, phase, reply }).await
    }

    pub async fn latest_profiling(&self, user_id: &str, org_id: &str) -> Result<Option<SessionRow>, StoreError> {
        let user_id = user_id.to_string();
        let org_id = org_id.to_string();
        self.request(|reply| StoreCommand::LatestProfiling { user_id, org_id, reply }).await
    }

    pub async fn insert_insight(&self, row: TerritoryInsightRow) -> Result<(), StoreError> {
        self.request(|reply| StoreCommand::InsertInsight { row, reply }).await
    }

    pub async fn mapped_insights(&self, session_id: &str) -> Result<Vec<TerritoryInsightRow>, StoreError> {
        let session_id = session_id.to_string();
        self.request(|reply| StoreCommand::MappedInsights { session_id, reply }).await
    }

    pub async fn insert_synthesis(&self, record: SynthesisRecord) -> Result<(), StoreError> {
        self.request(|reply| StoreCommand::InsertSynthesis { record, reply }).await
    }

    pub async fn latest_synthesis(&self, session_id: &str) -> Result<Option<SynthesisRecord>, StoreError> {
        let session_id = session_id.to_string();
        self.request(|reply| StoreCommand::LatestSynthesis { session_id, reply }).await
    }

    /// Ask the actor to stop; outstanding commands are dropped
    pub async fn shutdown(&self) {
        let _ = self.tx.send(StoreCommand::Shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> StoreHandle {
        spawn_store(SessionStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_actor_roundtrip() {
        let store = handle();

        let profile = OrgProfile::new("org-1", "Acme");
        store.upsert_org_profile(profile).await.unwrap();

        let loaded = store.get_org_profile("org-1").await.unwrap().unwrap();
        assert_eq!(loaded.company_name, "Acme");
        assert!(store.get_org_profile("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_actor_session_flow() {
        let store = handle();
        let row = SessionRow::new("org-1", None, sessionstore::SessionKind::Coaching, "{}".to_string());
        let id = row.id.clone();

        store.create_session(row).await.unwrap();
        store.update_session_state(&id, "{\"v\":1}".to_string()).await.unwrap();
        store.set_session_phase(&id, "research").await.unwrap();

        let loaded = store.get_session(&id).await.unwrap().unwrap();
        assert_eq!(loaded.state_json, "{\"v\":1}");
        assert_eq!(loaded.phase, "research");
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let store = handle();
        store.shutdown().await;
        // Give the actor a moment to drain.
        tokio::task::yield_now().await;

        let result = store.get_org_profile("org-1").await;
        assert!(matches!(result, Err(StoreError::ChannelClosed) | Ok(None)));
    }
}
