//! Per-session conversation histories for the HTTP surface
//!
//! Each session owns one [`ConversationHistory`] behind its own lock. A roast
//! holds that lock for its whole duration, so calls within a session are
//! serialized while different sessions proceed independently.

use crate::error::{AppError, AppResult};
use crate::roast::ConversationHistory;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

type SharedHistory = Arc<Mutex<ConversationHistory>>;

/// In-memory session registry
///
/// Histories live only as long as the process; nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedHistory>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty session and return its id
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(ConversationHistory::new())));
        tracing::debug!(session_id = %id, "Created session");
        id
    }

    /// Take exclusive access to a session's history for one roast
    ///
    /// # Errors
    ///
    /// - `AppError::SessionNotFound` if the id is unknown
    /// - `AppError::SessionBusy` if another roast on this session is in flight
    pub async fn checkout(&self, id: Uuid) -> AppResult<OwnedMutexGuard<ConversationHistory>> {
        let history = self.get(id).await?;
        history.try_lock_owned().map_err(|_| {
            tracing::warn!(session_id = %id, "Rejected concurrent roast on busy session");
            AppError::SessionBusy(id)
        })
    }

    /// Copy of a session's history, waiting for any in-flight roast to finish
    pub async fn snapshot(&self, id: Uuid) -> AppResult<ConversationHistory> {
        let history = self.get(id).await?;
        let guard = history.lock().await;
        Ok(guard.clone())
    }

    /// Drop a session; returns whether it existed
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn get(&self, id: Uuid) -> AppResult<SharedHistory> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::SessionNotFound(id))
    }
}
