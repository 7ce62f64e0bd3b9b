//! Per-operator workflow context.
//!
//! Each session owns the participant table and the artefacts produced from it. Sessions
//! are created explicitly, cleared on reset and expire after a period of inactivity.

pub mod handlers;

use moka::future::Cache;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::participant::ParticipantRecord;

/// A generated or uploaded document kept in memory.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct EventSession {
    pub participants: Vec<ParticipantRecord>,
    pub source: Option<String>,
    pub participant_list: Option<PathBuf>,
    pub report: Option<StoredDocument>,
    pub submission_zip: Option<PathBuf>,
    pub submission_event: Option<String>,
}

impl EventSession {
    /// Replaces the whole participant table.
    pub fn replace_participants(&mut self, participants: Vec<ParticipantRecord>, source: impl Into<String>) {
        self.participants = participants;
        self.source = Some(source.into());
    }

    /// Forgets the artefacts of a completed submission.
    pub fn clear_submission(&mut self) {
        self.submission_zip = None;
        self.submission_event = None;
        self.report = None;
    }
}

pub type SharedSession = Arc<RwLock<EventSession>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, SharedSession>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(1_000)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .insert(id, Arc::new(RwLock::new(EventSession::default())))
            .await;
        log::info!("Created session {}", id);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.get(id).await
    }

    /// Drops the session and everything it holds. Returns false for unknown ids.
    pub async fn reset(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).await.is_some();
        if removed {
            log::info!("Reset session {}", id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create().await;

        let session = store.get(&id).await.expect("session exists");
        session.write().replace_participants(
            vec![ParticipantRecord::new("Max Mustermann", "", "", "ERASMUS", "")],
            "csv",
        );
        assert_eq!(store.get(&id).await.unwrap().read().participants.len(), 1);

        assert!(store.reset(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(!store.reset(&id).await);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create().await;
        let b = store.create().await;

        store.get(&a).await.unwrap().write().source = Some("sheet".to_string());
        assert!(store.get(&b).await.unwrap().read().source.is_none());
    }

    #[test]
    fn test_clear_submission_keeps_participants() {
        let mut session = EventSession::default();
        session.replace_participants(vec![ParticipantRecord::default()], "snapshot");
        session.submission_zip = Some(PathBuf::from("output/a.zip"));
        session.report = Some(StoredDocument {
            filename: "Erfahrungsbericht.pdf".to_string(),
            bytes: vec![1],
        });

        session.clear_submission();
        assert!(session.submission_zip.is_none());
        assert!(session.report.is_none());
        assert_eq!(session.participants.len(), 1);
    }
}
