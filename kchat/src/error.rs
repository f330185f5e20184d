//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use kmemory::{BatchError, MemoryError};
use kprovider::ProviderError;
use ksession::{InvocationError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Invocation,
    Session,
    Store,
    Batch,
}

/// The lower-layer error a [`ChatError`] was raised from, kept intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatErrorSource {
    Invocation(InvocationError),
    Session(SessionError),
    Memory(MemoryError),
    Batch(BatchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub source: Option<ChatErrorSource>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn with_source(mut self, source: ChatErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn invocation_error(&self) -> Option<&InvocationError> {
        match &self.source {
            Some(ChatErrorSource::Invocation(error)) => Some(error),
            _ => None,
        }
    }

    /// The provider failure behind an invocation error, if any.
    pub fn provider_cause(&self) -> Option<&ProviderError> {
        self.invocation_error()
            .and_then(|error| error.cause.as_ref())
    }

    pub fn batch_error(&self) -> Option<&BatchError> {
        match &self.source {
            Some(ChatErrorSource::Batch(error)) => Some(error),
            _ => None,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.source.as_ref()? {
            ChatErrorSource::Invocation(error) => Some(error),
            ChatErrorSource::Session(error) => Some(error),
            ChatErrorSource::Memory(error) => Some(error),
            ChatErrorSource::Batch(error) => Some(error),
        }
    }
}

impl From<InvocationError> for ChatError {
    fn from(value: InvocationError) -> Self {
        ChatError::new(ChatErrorKind::Invocation, value.to_string())
            .with_source(ChatErrorSource::Invocation(value))
    }
}

impl From<SessionError> for ChatError {
    fn from(value: SessionError) -> Self {
        ChatError::new(ChatErrorKind::Session, value.to_string())
            .with_source(ChatErrorSource::Session(value))
    }
}

impl From<MemoryError> for ChatError {
    fn from(value: MemoryError) -> Self {
        ChatError::new(ChatErrorKind::Store, value.to_string())
            .with_source(ChatErrorSource::Memory(value))
    }
}

impl From<BatchError> for ChatError {
    fn from(value: BatchError) -> Self {
        ChatError::new(ChatErrorKind::Batch, value.to_string())
            .with_source(ChatErrorSource::Batch(value))
    }
}
