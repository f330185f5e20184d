use std::time::Duration;

use kcommon::ConversationKey;

use crate::ChatError;

pub trait ChatTurnHooks: Send + Sync {
    fn on_turn_start(&self, _conversation: &ConversationKey) {}

    fn on_history_trimmed(&self, _conversation: &ConversationKey, _removed: usize, _kept: usize) {}

    fn on_turn_success(
        &self,
        _conversation: &ConversationKey,
        _transcript_len: usize,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_failure(&self, _conversation: &ConversationKey, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatTurnHooks;

impl ChatTurnHooks for NoopChatTurnHooks {}
