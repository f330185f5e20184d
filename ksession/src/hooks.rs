//! Hook contracts for observing session construction and invocation.
//!
//! ```rust
//! use ksession::{NoopSessionHooks, SessionHooks};
//!
//! fn accepts_hooks(_hooks: &dyn SessionHooks) {}
//!
//! let hooks = NoopSessionHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use crate::{InvocationError, SessionError, SessionKey};

pub trait SessionHooks: Send + Sync {
    fn on_session_reused(&self, _key: &SessionKey, _instance_id: u64) {}

    fn on_session_built(
        &self,
        _key: &SessionKey,
        _instance_id: u64,
        _refreshed: bool,
        _elapsed: Duration,
    ) {
    }

    fn on_session_failed(&self, _key: &SessionKey, _error: &SessionError) {}

    fn on_invocation_start(&self, _key: &SessionKey, _operation: &str) {}

    fn on_invocation_success(&self, _key: &SessionKey, _operation: &str, _elapsed: Duration) {}

    fn on_invocation_failure(
        &self,
        _key: &SessionKey,
        _operation: &str,
        _error: &InvocationError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionHooks;

impl SessionHooks for NoopSessionHooks {}
