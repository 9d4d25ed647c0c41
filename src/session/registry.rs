use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::controller::SessionController;
use crate::rag::RagOrchestrator;

/// A live session. The async mutex serializes turns within one session.
pub type SessionHandle = Arc<tokio::sync::Mutex<SessionController>>;

struct Slot {
    controller: SessionHandle,
    last_active: Instant,
}

/// Every live session, keyed by id. Sessions never share transcripts.
#[derive(Clone)]
pub struct SessionRegistry {
    orchestrator: Arc<RagOrchestrator>,
    max_pairs: usize,
    sessions: Arc<Mutex<HashMap<String, Slot>>>,
}

impl SessionRegistry {
    pub fn new(orchestrator: Arc<RagOrchestrator>, max_pairs: usize) -> Self {
        Self {
            orchestrator,
            max_pairs,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // The map holds no invariants a panicking holder could break.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts a session with an empty transcript and returns its id.
    pub fn create(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let controller = SessionController::new(self.orchestrator.clone(), self.max_pairs);
        self.lock().insert(
            session_id.clone(),
            Slot {
                controller: Arc::new(tokio::sync::Mutex::new(controller)),
                last_active: Instant::now(),
            },
        );
        tracing::debug!("Session {} started", session_id);
        session_id
    }

    /// Looks up a session and marks it active.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let mut sessions = self.lock();
        let slot = sessions.get_mut(session_id)?;
        slot.last_active = Instant::now();
        Some(slot.controller.clone())
    }

    /// Ends a session, discarding its transcript.
    pub fn end(&self, session_id: &str) -> bool {
        let removed = self.lock().remove(session_id).is_some();
        if removed {
            tracing::debug!("Session {} ended", session_id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops sessions idle for longer than `ttl`. Sessions with a turn in
    /// flight are kept. Returns how many were dropped.
    pub fn prune_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, slot| {
            let in_use = Arc::strong_count(&slot.controller) > 1;
            in_use || now.duration_since(slot.last_active) < ttl
        });
        before - sessions.len()
    }
}
