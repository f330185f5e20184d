use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use kchat::{ChatError, ChatTurnHooks};
use kcommon::ConversationKey;
use kmemory::{BatchHooks, OperationFailure, OperationId};
use ksession::{InvocationError, SessionError, SessionHooks, SessionKey};

pub struct SafeSessionHooks<H> {
    inner: H,
}

impl<H> SafeSessionHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> SessionHooks for SafeSessionHooks<H>
where
    H: SessionHooks,
{
    fn on_session_reused(&self, key: &SessionKey, instance_id: u64) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_session_reused(key, instance_id)
        }));
    }

    fn on_session_built(
        &self,
        key: &SessionKey,
        instance_id: u64,
        refreshed: bool,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_session_built(key, instance_id, refreshed, elapsed)
        }));
    }

    fn on_session_failed(&self, key: &SessionKey, error: &SessionError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_session_failed(key, error)));
    }

    fn on_invocation_start(&self, key: &SessionKey, operation: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_invocation_start(key, operation)
        }));
    }

    fn on_invocation_success(&self, key: &SessionKey, operation: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_invocation_success(key, operation, elapsed)
        }));
    }

    fn on_invocation_failure(
        &self,
        key: &SessionKey,
        operation: &str,
        error: &InvocationError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_invocation_failure(key, operation, error, elapsed)
        }));
    }
}

pub struct SafeChatTurnHooks<H> {
    inner: H,
}

impl<H> SafeChatTurnHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatTurnHooks for SafeChatTurnHooks<H>
where
    H: ChatTurnHooks,
{
    fn on_turn_start(&self, conversation: &ConversationKey) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_turn_start(conversation)));
    }

    fn on_history_trimmed(&self, conversation: &ConversationKey, removed: usize, kept: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_history_trimmed(conversation, removed, kept)
        }));
    }

    fn on_turn_success(&self, conversation: &ConversationKey, transcript_len: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_success(conversation, transcript_len, elapsed)
        }));
    }

    fn on_turn_failure(&self, conversation: &ConversationKey, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(conversation, error, elapsed)
        }));
    }
}

pub struct SafeBatchHooks<H> {
    inner: H,
}

impl<H> SafeBatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> BatchHooks for SafeBatchHooks<H>
where
    H: BatchHooks,
{
    fn on_operation_enqueued(&self, id: OperationId, label: &str, pending: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_operation_enqueued(id, label, pending)
        }));
    }

    fn on_join_start(&self, pending: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_join_start(pending)));
    }

    fn on_operation_failed(&self, failure: &OperationFailure) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_operation_failed(failure)));
    }

    fn on_join_complete(&self, succeeded: usize, failed: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_join_complete(succeeded, failed, elapsed)
        }));
    }
}
