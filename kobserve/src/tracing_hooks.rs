//! Tracing-based observability hooks for session, chat and batch phases.
//!
//! ```rust
//! use kobserve::TracingObservabilityHooks;
//! use kchat::ChatTurnHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatTurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use kchat::{ChatError, ChatTurnHooks};
use kcommon::ConversationKey;
use kmemory::{BatchHooks, OperationFailure, OperationId};
use ksession::{InvocationError, SessionError, SessionHooks, SessionKey};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl SessionHooks for TracingObservabilityHooks {
    fn on_session_reused(&self, key: &SessionKey, instance_id: u64) {
        tracing::debug!(
            phase = "session",
            event = "reused",
            session_key = %key,
            instance_id
        );
    }

    fn on_session_built(
        &self,
        key: &SessionKey,
        instance_id: u64,
        refreshed: bool,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "session",
            event = "built",
            session_key = %key,
            platform = %key.platform,
            instance_id,
            refreshed,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_session_failed(&self, key: &SessionKey, error: &SessionError) {
        tracing::error!(
            phase = "session",
            event = "failed",
            session_key = %key,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_invocation_start(&self, key: &SessionKey, operation: &str) {
        tracing::info!(
            phase = "session",
            event = "invocation_start",
            session_key = %key,
            operation
        );
    }

    fn on_invocation_success(&self, key: &SessionKey, operation: &str, elapsed: Duration) {
        tracing::info!(
            phase = "session",
            event = "invocation_success",
            session_key = %key,
            operation,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_invocation_failure(
        &self,
        key: &SessionKey,
        operation: &str,
        error: &InvocationError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "session",
            event = "invocation_failure",
            session_key = %key,
            operation,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.is_retryable(),
            error = %error
        );
    }
}

impl ChatTurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, conversation: &ConversationKey) {
        tracing::info!(
            phase = "chat",
            event = "turn_start",
            conversation_key = %conversation
        );
    }

    fn on_history_trimmed(&self, conversation: &ConversationKey, removed: usize, kept: usize) {
        tracing::debug!(
            phase = "chat",
            event = "history_trimmed",
            conversation_key = %conversation,
            removed,
            kept
        );
    }

    fn on_turn_success(&self, conversation: &ConversationKey, transcript_len: usize, elapsed: Duration) {
        tracing::info!(
            phase = "chat",
            event = "turn_success",
            conversation_key = %conversation,
            transcript_len,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, conversation: &ConversationKey, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            conversation_key = %conversation,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl BatchHooks for TracingObservabilityHooks {
    fn on_operation_enqueued(&self, id: OperationId, label: &str, pending: usize) {
        tracing::debug!(
            phase = "batch",
            event = "enqueued",
            operation_id = id,
            label,
            pending
        );
    }

    fn on_join_start(&self, pending: usize) {
        tracing::info!(phase = "batch", event = "join_start", pending);
    }

    fn on_operation_failed(&self, failure: &OperationFailure) {
        tracing::warn!(
            phase = "batch",
            event = "operation_failed",
            operation_id = failure.id,
            label = %failure.label,
            error = %failure.message
        );
    }

    fn on_join_complete(&self, succeeded: usize, failed: usize, elapsed: Duration) {
        if failed == 0 {
            tracing::info!(
                phase = "batch",
                event = "join_complete",
                succeeded,
                failed,
                elapsed_ms = elapsed.as_millis() as u64
            );
        } else {
            tracing::error!(
                phase = "batch",
                event = "join_complete",
                succeeded,
                failed,
                elapsed_ms = elapsed.as_millis() as u64
            );
        }
    }
}
