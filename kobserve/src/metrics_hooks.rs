//! Metrics-based observability hooks for session, chat and batch phases.
//!
//! ```rust
//! use kobserve::MetricsObservabilityHooks;
//! use ksession::SessionHooks;
//!
//! fn accepts_session_hooks(_hooks: &dyn SessionHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_session_hooks(&hooks);
//! ```

use std::time::Duration;

use kchat::{ChatError, ChatTurnHooks};
use kcommon::ConversationKey;
use kmemory::{BatchHooks, OperationFailure, OperationId};
use ksession::{InvocationError, SessionError, SessionHooks, SessionKey};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl SessionHooks for MetricsObservabilityHooks {
    fn on_session_reused(&self, key: &SessionKey, _instance_id: u64) {
        metrics::counter!(
            "kestrel_session_reused_total",
            "platform" => key.platform.to_string(),
            "purpose" => key.purpose.to_string()
        )
        .increment(1);
    }

    fn on_session_built(
        &self,
        key: &SessionKey,
        _instance_id: u64,
        refreshed: bool,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "kestrel_session_built_total",
            "platform" => key.platform.to_string(),
            "purpose" => key.purpose.to_string(),
            "refreshed" => refreshed.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "kestrel_session_build_seconds",
            "platform" => key.platform.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_session_failed(&self, key: &SessionKey, error: &SessionError) {
        metrics::counter!(
            "kestrel_session_failed_total",
            "platform" => key.platform.to_string(),
            "purpose" => key.purpose.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_invocation_start(&self, key: &SessionKey, operation: &str) {
        metrics::counter!(
            "kestrel_session_invocation_start_total",
            "platform" => key.platform.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_invocation_success(&self, key: &SessionKey, operation: &str, elapsed: Duration) {
        metrics::counter!(
            "kestrel_session_invocation_success_total",
            "platform" => key.platform.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "kestrel_session_invocation_seconds",
            "platform" => key.platform.to_string(),
            "operation" => operation.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_invocation_failure(
        &self,
        key: &SessionKey,
        operation: &str,
        error: &InvocationError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "kestrel_session_invocation_failure_total",
            "platform" => key.platform.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "kestrel_session_invocation_seconds",
            "platform" => key.platform.to_string(),
            "operation" => operation.to_string()
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatTurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _conversation: &ConversationKey) {
        metrics::counter!("kestrel_chat_turn_start_total").increment(1);
    }

    fn on_history_trimmed(&self, _conversation: &ConversationKey, removed: usize, _kept: usize) {
        metrics::counter!("kestrel_chat_turns_trimmed_total").increment(removed as u64);
    }

    fn on_turn_success(&self, _conversation: &ConversationKey, transcript_len: usize, elapsed: Duration) {
        metrics::counter!("kestrel_chat_turn_success_total").increment(1);
        metrics::histogram!("kestrel_chat_turn_seconds").record(elapsed.as_secs_f64());
        metrics::histogram!("kestrel_chat_transcript_bytes").record(transcript_len as f64);
    }

    fn on_turn_failure(&self, _conversation: &ConversationKey, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "kestrel_chat_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("kestrel_chat_turn_seconds").record(elapsed.as_secs_f64());
    }
}

impl BatchHooks for MetricsObservabilityHooks {
    fn on_operation_enqueued(&self, _id: OperationId, _label: &str, pending: usize) {
        metrics::counter!("kestrel_batch_enqueued_total").increment(1);
        metrics::gauge!("kestrel_batch_pending").set(pending as f64);
    }

    fn on_join_start(&self, pending: usize) {
        metrics::histogram!("kestrel_batch_join_pending").record(pending as f64);
    }

    fn on_operation_failed(&self, _failure: &OperationFailure) {
        metrics::counter!("kestrel_batch_operation_failed_total").increment(1);
    }

    fn on_join_complete(&self, succeeded: usize, failed: usize, elapsed: Duration) {
        metrics::counter!("kestrel_batch_operation_succeeded_total").increment(succeeded as u64);
        metrics::counter!(
            "kestrel_batch_join_total",
            "outcome" => if failed == 0 { "success" } else { "failure" }
        )
        .increment(1);
        metrics::histogram!("kestrel_batch_join_seconds").record(elapsed.as_secs_f64());
        metrics::gauge!("kestrel_batch_pending").set(0.0);
    }
}
