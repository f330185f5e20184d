//! Common imports for most kestrel applications.

#[cfg(feature = "http")]
pub use crate::{
    HttpClientFactory, build_runtime, build_runtime_from_env, build_runtime_with_client,
    http_client_factory,
};
pub use crate::{
    AiSettings, Arguments, BatchError, BatchReport, ChatConfig, ChatError, ChatErrorKind,
    ChatOrchestrator, ChatTurnRequest, ChatTurnResult, ClientFactory, ConversationKey,
    GenerationOptions, HistoryStore, InvocationError, InvokeOptions, MemoryRecord, MemoryStore,
    MemoryWriteQueue, PlatformSelector, ProviderError, Purpose, RuntimeBundle, SemanticMemory,
    Session, SessionError, SessionFactory, SessionRequest, TranscriptMarkers, UserId,
    build_runtime_with, embedding_memory, in_memory_history, in_memory_memory_store, information,
    init_tracing, parse_platform, parse_purpose, reference, session_request, trim_history, turn,
};
pub use crate::{k_args, k_request};
