use std::{collections::HashMap, sync::Mutex, time::Duration};

use tokio::time::Instant;

use crate::{
    error::SessionError,
    types::{SearchSession, SongRecord},
};

/// Pending search results keyed by conversation id.
///
/// Every operation takes the lock once and finishes under it, so a check
/// followed by a removal is never interleaved with another caller. The lock
/// is never held across an `.await`.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SearchSession>>,
    expiry: Duration,
}

impl SessionStore {
    pub fn new(expiry: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            expiry,
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Replaces whatever session `conversation_id` had. Last writer wins.
    pub fn put(&self, conversation_id: &str, results: Vec<SongRecord>) {
        let session = SearchSession {
            conversation_id: conversation_id.to_string(),
            results,
            created_at: Instant::now(),
        };
        let replaced = self
            .lock()
            .insert(conversation_id.to_string(), session)
            .is_some();
        tracing::debug!(
            "stored search session for {} (replaced: {})",
            conversation_id,
            replaced
        );
    }

    pub fn peek(&self, conversation_id: &str) -> Option<SearchSession> {
        self.lock().get(conversation_id).cloned()
    }

    /// Consumes the session and returns the song at the 0-based `index`.
    ///
    /// - no session: [`SessionError::NotFound`]
    /// - session older than the expiry window: removed, [`SessionError::Expired`]
    /// - `index` out of range: session kept, [`SessionError::OutOfRange`]
    pub fn take_if_valid(
        &self,
        conversation_id: &str,
        index: usize,
    ) -> Result<SongRecord, SessionError> {
        let now = Instant::now();
        let mut sessions = self.lock();

        let session = sessions
            .get(conversation_id)
            .ok_or(SessionError::NotFound)?;

        if self.is_expired(session, now) {
            sessions.remove(conversation_id);
            return Err(SessionError::Expired);
        }

        let len = session.results.len();
        if index >= len {
            return Err(SessionError::OutOfRange { index, len });
        }

        let mut session = sessions
            .remove(conversation_id)
            .ok_or(SessionError::NotFound)?;
        Ok(session.results.swap_remove(index))
    }

    /// Removes every session older than the expiry window at `now`.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        before - sessions.len()
    }

    /// Empties the table, returning how many sessions were dropped.
    pub fn drain(&self) -> usize {
        let mut sessions = self.lock();
        let count = sessions.len();
        sessions.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, session: &SearchSession, now: Instant) -> bool {
        now.saturating_duration_since(session.created_at) > self.expiry
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SearchSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
