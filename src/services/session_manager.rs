// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::info;

use crate::services::chat_orchestrator::ChatOrchestrator;

#[derive(Clone, Debug)]
pub struct Session {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub last_active: Instant,
}

impl Session {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self { orchestrator, last_active: Instant::now() }
    }
}

/// Mounted chat views, keyed by session id.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    // Register a freshly mounted orchestrator and hand back the shared handle.
    pub async fn insert(&self, orchestrator: ChatOrchestrator) -> Arc<ChatOrchestrator> {
        let orchestrator = Arc::new(orchestrator);
        let id = orchestrator.session_id().to_string();

        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), Session::new(orchestrator.clone()));
        info!(session_id = %id, "chat view mounted");
        orchestrator
    }

    /// Look up a session and touch last_active.
    pub async fn get(&self, session_id: &str) -> Option<Arc<ChatOrchestrator>> {
        let mut guard = self.inner.write().await;
        guard.get_mut(session_id).map(|s| {
            s.last_active = Instant::now();
            s.orchestrator.clone()
        })
    }

    /// Tear a session down. In-flight cycles finish against the orphaned
    /// orchestrator and their results are dropped with it.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        let removed = guard.remove(session_id).is_some();
        if removed {
            info!(session_id, "chat view torn down");
        }
        removed
    }

    /// Remove sessions idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, s| now.duration_since(s.last_active) < self.ttl);
        before - guard.len()
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// List session ids
    pub async fn list_session_ids(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        guard.keys().cloned().collect()
    }
}
