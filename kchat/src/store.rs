//! Per-conversation argument storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use kcommon::{BoxFuture, ConversationKey};
use ksession::Arguments;

use crate::ChatError;

/// Named arguments (the transcript among them) kept between turns of a conversation.
pub trait HistoryStore: Send + Sync {
    /// Empty arguments for a conversation that has never been saved.
    fn load<'a>(&'a self, key: &'a ConversationKey) -> BoxFuture<'a, Result<Arguments, ChatError>>;

    fn save<'a>(
        &'a self,
        key: &'a ConversationKey,
        arguments: Arguments,
    ) -> BoxFuture<'a, Result<(), ChatError>>;

    fn remove<'a>(&'a self, key: &'a ConversationKey) -> BoxFuture<'a, Result<bool, ChatError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    conversations: Mutex<HashMap<ConversationKey, Arguments>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn conversations(&self) -> Result<MutexGuard<'_, HashMap<ConversationKey, Arguments>>, ChatError> {
        self.conversations
            .lock()
            .map_err(|_| ChatError::store("history store lock poisoned"))
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn load<'a>(&'a self, key: &'a ConversationKey) -> BoxFuture<'a, Result<Arguments, ChatError>> {
        Box::pin(async move { Ok(self.conversations()?.get(key).cloned().unwrap_or_default()) })
    }

    fn save<'a>(
        &'a self,
        key: &'a ConversationKey,
        arguments: Arguments,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.conversations()?.insert(key.clone(), arguments);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a ConversationKey) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move { Ok(self.conversations()?.remove(key).is_some()) })
    }
}
