//! Session construction and invocation errors.
//!
//! ```rust
//! use std::error::Error;
//!
//! use kprovider::ProviderError;
//! use ksession::{InvocationError, InvocationErrorKind, SessionError, SessionErrorKind};
//!
//! let unsupported = SessionError::unsupported_platform("huggingface has no image branch");
//! assert_eq!(unsupported.kind, SessionErrorKind::UnsupportedPlatform);
//!
//! let invocation = InvocationError::from(ProviderError::rate_limited("slow down"));
//! assert_eq!(invocation.kind, InvocationErrorKind::Provider);
//! assert!(invocation.source().is_some());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use kprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    UnsupportedPlatform,
    InvalidConfiguration,
    Client,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::UnsupportedPlatform, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::InvalidConfiguration, message)
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Client, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::Storage, message)
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SessionError {}

impl From<ProviderError> for SessionError {
    fn from(value: ProviderError) -> Self {
        SessionError::client(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationErrorKind {
    Provider,
    Timeout,
    Cancelled,
    FunctionNotFound,
    Internal,
}

/// A failed call across the provider boundary, keeping the provider-reported cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationError {
    pub kind: InvocationErrorKind,
    pub message: String,
    pub cause: Option<ProviderError>,
}

impl InvocationError {
    pub fn new(kind: InvocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(InvocationErrorKind::Timeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(InvocationErrorKind::Cancelled, message)
    }

    pub fn function_not_found(message: impl Into<String>) -> Self {
        Self::new(InvocationErrorKind::FunctionNotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(InvocationErrorKind::Internal, message)
    }

    pub fn with_cause(mut self, cause: ProviderError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.cause.as_ref().is_some_and(|cause| cause.retryable)
    }
}

impl Display for InvocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for InvocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl From<ProviderError> for InvocationError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::Timeout => InvocationErrorKind::Timeout,
            ProviderErrorKind::Cancelled => InvocationErrorKind::Cancelled,
            _ => InvocationErrorKind::Provider,
        };

        Self::new(kind, value.message.clone()).with_cause(value)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use kprovider::ProviderError;

    use super::{InvocationError, InvocationErrorKind, SessionError, SessionErrorKind};

    #[test]
    fn provider_timeouts_keep_the_timeout_subtype() {
        let error = InvocationError::from(ProviderError::timeout("upstream took too long"));
        assert_eq!(error.kind, InvocationErrorKind::Timeout);
        assert!(error.is_retryable());
        assert_eq!(
            error.source().map(ToString::to_string),
            Some("Timeout: upstream took too long".to_string())
        );
    }

    #[test]
    fn provider_auth_failures_map_to_provider_kind() {
        let error = InvocationError::from(ProviderError::authentication("bad key"));
        assert_eq!(error.kind, InvocationErrorKind::Provider);
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "Provider: bad key");
    }

    #[test]
    fn local_invocation_errors_have_no_cause() {
        let error = InvocationError::cancelled("caller gave up");
        assert!(error.source().is_none());
        assert!(!error.is_retryable());
    }

    #[test]
    fn client_build_failures_become_client_session_errors() {
        let error = SessionError::from(ProviderError::invalid_request("no endpoint"));
        assert_eq!(error.kind, SessionErrorKind::Client);
        assert!(error.message.contains("no endpoint"));
    }
}
