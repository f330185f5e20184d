//! Memory-store errors and the aggregate error returned by a batch join.

use std::error::Error;
use std::fmt::{Display, Formatter};

use ksession::InvocationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorKind {
    Storage,
    NotFound,
    InvalidRequest,
    Embedding,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryError {
    pub kind: MemoryErrorKind,
    pub message: String,
}

impl MemoryError {
    pub fn new(kind: MemoryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::Storage, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::NotFound, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::InvalidRequest, message)
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::Embedding, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::Other, message)
    }
}

impl Display for MemoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for MemoryError {}

impl From<InvocationError> for MemoryError {
    fn from(error: InvocationError) -> Self {
        Self::embedding(error.to_string())
    }
}

pub type OperationId = u64;

/// One pending operation that did not finish successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    pub id: OperationId,
    pub label: String,
    pub message: String,
}

impl Display for OperationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}: {}", self.id, self.label, self.message)
    }
}

/// Every failure collected by a join, plus how many operations succeeded alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub failures: Vec<OperationFailure>,
    pub succeeded: usize,
}

impl BatchError {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.failures.len() + self.succeeded
    }

    /// True when no operation in the joined batch succeeded.
    pub fn is_total_failure(&self) -> bool {
        self.succeeded == 0
    }
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} pending operations failed",
            self.failed(),
            self.total()
        )?;
        for (index, failure) in self.failures.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{failure}")?;
        }
        Ok(())
    }
}

impl Error for BatchError {}
