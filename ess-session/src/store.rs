//! SessionStore: per-session transcripts behind per-key locks.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use ess_core::models::{Transcript, Turn};

/// Shared handle to one session's transcript.
///
/// Holding the guard returned by [`SessionHandle::lock`] serialises every
/// read-modify-append on this session while other sessions proceed.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: String,
    transcript: Arc<Mutex<Transcript>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Exclusive access to the transcript. A poisoned lock is recovered: turns
    /// are only ever appended in pairs under this lock, so the data is intact.
    pub fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(session_id = %self.session_id, "recovering poisoned session lock");
            poisoned.into_inner()
        })
    }
}

/// Thread-safe transcript store keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Transcript>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for a session, creating an empty transcript on first reference.
    /// The map shard is locked only long enough to fetch or insert the entry.
    pub fn session(&self, session_id: &str) -> SessionHandle {
        let transcript = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, "creating session transcript");
                Arc::new(Mutex::new(Transcript::new()))
            })
            .value()
            .clone();
        SessionHandle {
            session_id: session_id.to_string(),
            transcript,
        }
    }

    /// Snapshot of a session's transcript (empty for a new session).
    pub fn get(&self, session_id: &str) -> Transcript {
        self.session(session_id).lock().clone()
    }

    /// Append one turn.
    pub fn append(&self, session_id: &str, turn: Turn) {
        self.session(session_id).lock().push(turn);
    }

    /// Run `f` with exclusive access to the session's transcript.
    pub fn with_transcript<R>(&self, session_id: &str, f: impl FnOnce(&mut Transcript) -> R) -> R {
        let handle = self.session(session_id);
        let mut guard = handle.lock();
        f(&mut guard)
    }

    /// Number of sessions seen so far.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }
}
