//! Session registry: the single source of truth for live sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::session::LogSession;

/// Process-wide map from session id to session state.
///
/// An explicit object injected into whoever needs it - there is no global
/// registry. Scoped to process lifetime; sessions are only removed by an
/// explicit stop.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<LogSession>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a session by ID.
    pub async fn get(&self, id: &str) -> Option<Arc<LogSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Insert a session, keyed by its own id. Replaces any previous entry
    /// for that id.
    pub async fn insert(&self, session: Arc<LogSession>) {
        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session);
    }

    /// Remove and return the session for an ID.
    pub async fn remove(&self, id: &str) -> Option<Arc<LogSession>> {
        self.sessions.write().await.remove(id)
    }

    /// Snapshot of all sessions.
    pub async fn list(&self) -> Vec<Arc<LogSession>> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
