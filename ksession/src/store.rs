//! Session cache storage contracts and the in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Session, SessionError, SessionKey};

/// Where built sessions live between requests. Replacing an entry swaps the `Arc`, so readers
/// holding the old session keep a complete value.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &SessionKey) -> Result<Option<Arc<Session>>, SessionError>;

    /// Stores `session`, returning the session it replaced.
    fn insert(
        &self,
        key: SessionKey,
        session: Arc<Session>,
    ) -> Result<Option<Arc<Session>>, SessionError>;

    fn remove(&self, key: &SessionKey) -> Result<Option<Arc<Session>>, SessionError>;

    fn keys(&self) -> Result<Vec<SessionKey>, SessionError>;

    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionKey, Arc<Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<SessionKey, Arc<Session>>>, SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::storage("session store lock poisoned"))
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &SessionKey) -> Result<Option<Arc<Session>>, SessionError> {
        Ok(self.sessions()?.get(key).cloned())
    }

    fn insert(
        &self,
        key: SessionKey,
        session: Arc<Session>,
    ) -> Result<Option<Arc<Session>>, SessionError> {
        Ok(self.sessions()?.insert(key, session))
    }

    fn remove(&self, key: &SessionKey) -> Result<Option<Arc<Session>>, SessionError> {
        Ok(self.sessions()?.remove(key))
    }

    fn keys(&self) -> Result<Vec<SessionKey>, SessionError> {
        Ok(self.sessions()?.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.sessions()?.clear();
        Ok(())
    }
}
