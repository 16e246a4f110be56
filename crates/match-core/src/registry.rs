//! Conversation → session map shared by the chat front end.
//!
//! The map itself sits behind one `RwLock`; each session has its own
//! `Mutex` so a long engine search in one conversation never blocks the
//! others. Callers hold the session lock for a whole command.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::error::SessionError;
use crate::oracle::MoveOracle;
use crate::session::Session;
use crate::snapshot::SessionSnapshot;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, conversation: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(conversation).cloned()
    }

    /// Register a new session. Fails if the conversation already has an
    /// active one; a finished session is replaced.
    pub async fn insert(
        &self,
        conversation: &str,
        session: Session,
    ) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(conversation) {
            // A session busy with another command is certainly active.
            let active = existing.try_lock().map(|s| s.is_active()).unwrap_or(true);
            if active {
                return Err(SessionError::SessionAlreadyActive);
            }
        }
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(conversation.to_string(), handle.clone());
        Ok(handle)
    }

    pub async fn remove(&self, conversation: &str) -> Option<SessionHandle> {
        self.sessions.write().await.remove(conversation)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Snapshot every session. The map lock is released before any
    /// session lock is taken.
    pub async fn snapshot(&self) -> Vec<(String, SessionSnapshot)> {
        let handles: Vec<(String, SessionHandle)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut out = Vec::with_capacity(handles.len());
        for (conversation, handle) in handles {
            let session = handle.lock().await;
            out.push((conversation, session.snapshot()));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Restore sessions from snapshots, skipping any the oracle rejects.
    /// Returns the number restored.
    pub async fn load(
        &self,
        entries: Vec<(String, SessionSnapshot)>,
        oracle: Arc<dyn MoveOracle>,
    ) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut restored = 0;
        for (conversation, snapshot) in entries {
            match snapshot.restore(oracle.clone()) {
                Ok(session) => {
                    sessions.insert(conversation, Arc::new(Mutex::new(session)));
                    restored += 1;
                }
                Err(e) => warn!(conversation = %conversation, error = %e, "Dropping unrestorable session"),
            }
        }
        info!(restored, "Sessions loaded");
        restored
    }
}
