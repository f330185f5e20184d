//! Chat turns over cached sessions with bounded, structurally trimmed transcripts.

mod config;
mod error;
mod hooks;
mod orchestrator;
mod store;
mod trim;

pub mod prelude {
    pub use crate::{
        ChatConfig, ChatError, ChatErrorKind, ChatErrorSource, ChatOrchestrator,
        ChatOrchestratorBuilder, ChatTurnHooks, ChatTurnRequest, ChatTurnResult, HistoryStore,
        InMemoryHistoryStore, NoopChatTurnHooks, TranscriptMarkers, TrimOutcome, trim_history,
    };
    pub use kcommon::ConversationKey;
}

pub use config::{
    ChatConfig, ChatTurnRequest, ChatTurnResult, DEFAULT_CHAT_FUNCTION, DEFAULT_CHAT_PLUGIN,
    DEFAULT_HISTORY_ARG, DEFAULT_HUMAN_INPUT_ARG,
};
pub use error::{ChatError, ChatErrorKind, ChatErrorSource};
pub use hooks::{ChatTurnHooks, NoopChatTurnHooks};
pub use kcommon::ConversationKey;
pub use orchestrator::{ChatOrchestrator, ChatOrchestratorBuilder, append_turn};
pub use store::{HistoryStore, InMemoryHistoryStore};
pub use trim::{
    DEFAULT_HUMAN_ID, DEFAULT_ROBOT_ID, TranscriptMarkers, TrimOutcome, count_turns, trim_history,
    turn_spans,
};
