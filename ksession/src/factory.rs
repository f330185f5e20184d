//! Builds, caches and refreshes sessions.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use kcommon::UserId;
use kprovider::{AiSettings, ClientFactory, PlatformSelector, Purpose};

use crate::{
    InMemorySessionStore, NoopSessionHooks, PlatformTable, Session, SessionError, SessionHooks,
    SessionKey, SessionStore,
};

/// What the caller wants a session for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub platform: PlatformSelector,
    pub user_id: UserId,
    pub model: String,
    pub purpose: Purpose,
    pub refresh: bool,
    /// Replaces the factory's default settings for this request only.
    pub settings: Option<AiSettings>,
}

impl SessionRequest {
    pub fn new(
        platform: PlatformSelector,
        user_id: impl Into<UserId>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            user_id: user_id.into(),
            model: model.into(),
            purpose: Purpose::Completion,
            refresh: false,
            settings: None,
        }
    }

    pub fn purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Forces a rebuild even when a session is cached for the key.
    pub fn refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    pub fn with_settings(mut self, settings: AiSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(
            self.platform,
            self.user_id.clone(),
            self.model.clone(),
            self.purpose,
        )
    }
}

pub struct SessionFactoryBuilder {
    clients: Arc<dyn ClientFactory>,
    table: PlatformTable,
    store: Arc<dyn SessionStore>,
    hooks: Arc<dyn SessionHooks>,
    settings: AiSettings,
}

impl SessionFactoryBuilder {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            table: PlatformTable::standard(),
            store: Arc::new(InMemorySessionStore::new()),
            hooks: Arc::new(NoopSessionHooks),
            settings: AiSettings::default(),
        }
    }

    pub fn table(mut self, table: PlatformTable) -> Self {
        self.table = table;
        self
    }

    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn settings(mut self, settings: AiSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> SessionFactory {
        SessionFactory {
            clients: self.clients,
            table: self.table,
            store: self.store,
            hooks: self.hooks,
            settings: self.settings,
            build_lock: Mutex::new(()),
        }
    }
}

/// Resolves requests into live sessions, reusing cached ones per [`SessionKey`].
///
/// Lookup, build and insert happen under one lock, so concurrent first requests for the
/// same key build exactly one session.
pub struct SessionFactory {
    clients: Arc<dyn ClientFactory>,
    table: PlatformTable,
    store: Arc<dyn SessionStore>,
    hooks: Arc<dyn SessionHooks>,
    settings: AiSettings,
    build_lock: Mutex<()>,
}

impl SessionFactory {
    pub fn builder(clients: Arc<dyn ClientFactory>) -> SessionFactoryBuilder {
        SessionFactoryBuilder::new(clients)
    }

    pub fn new(settings: AiSettings, clients: Arc<dyn ClientFactory>) -> Self {
        Self::builder(clients).settings(settings).build()
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    pub fn table(&self) -> &PlatformTable {
        &self.table
    }

    /// A completion request on the platform named by the default settings.
    pub fn request(&self, user_id: impl Into<UserId>, model: impl Into<String>) -> SessionRequest {
        SessionRequest::new(self.settings.platform, user_id, model)
    }

    pub fn get_session(&self, request: SessionRequest) -> Result<Arc<Session>, SessionError> {
        let key = request.key();
        if let Err(error) = validate_key(&key) {
            self.hooks.on_session_failed(&key, &error);
            return Err(error);
        }

        let _guard = self
            .build_lock
            .lock()
            .map_err(|_| SessionError::storage("session factory lock poisoned"))?;

        if !request.refresh {
            if let Some(session) = self.store.get(&key)? {
                self.hooks.on_session_reused(&key, session.instance_id());
                return Ok(session);
            }
        }

        let started = Instant::now();
        let settings = request.settings.as_ref().unwrap_or(&self.settings);
        let session = match self.build_session(settings, &key) {
            Ok(session) => Arc::new(session),
            Err(error) => {
                self.hooks.on_session_failed(&key, &error);
                return Err(error);
            }
        };

        self.store.insert(key.clone(), Arc::clone(&session))?;
        self.hooks.on_session_built(
            &key,
            session.instance_id(),
            request.refresh,
            started.elapsed(),
        );
        Ok(session)
    }

    pub fn cached(&self, key: &SessionKey) -> Result<Option<Arc<Session>>, SessionError> {
        self.store.get(key)
    }

    pub fn invalidate(&self, key: &SessionKey) -> Result<Option<Arc<Session>>, SessionError> {
        self.store.remove(key)
    }

    pub fn cached_keys(&self) -> Result<Vec<SessionKey>, SessionError> {
        self.store.keys()
    }

    fn build_session(&self, settings: &AiSettings, key: &SessionKey) -> Result<Session, SessionError> {
        let config = self.table.configure(settings, key)?;
        let client = self.clients.build(&config)?;
        Ok(Session::new(key.clone(), config, client).with_hooks(Arc::clone(&self.hooks)))
    }
}

fn validate_key(key: &SessionKey) -> Result<(), SessionError> {
    if key.user_id.as_str().trim().is_empty() {
        return Err(SessionError::invalid_configuration("user id must not be empty"));
    }

    if key.model.trim().is_empty() {
        return Err(SessionError::invalid_configuration("model name must not be empty"));
    }

    Ok(())
}
