//! Unified facade over the kestrel workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the kestrel crates and provides wiring helpers and macros for
//! the common session, chat and memory flows.

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use kchat;
pub use kcommon;
pub use kmemory;
pub use kobserve;
pub use kprovider;
pub use ksession;

pub use kchat::{
    ChatConfig, ChatError, ChatErrorKind, ChatErrorSource, ChatOrchestrator,
    ChatOrchestratorBuilder, ChatTurnHooks, ChatTurnRequest, ChatTurnResult, HistoryStore,
    InMemoryHistoryStore, NoopChatTurnHooks, TranscriptMarkers, TrimOutcome, count_turns,
    trim_history,
};
pub use kcommon::{BoxFuture, ConversationKey, GenerationOptions, MetadataMap, Registry, UserId};
pub use kmemory::{
    BatchError, BatchHooks, BatchReport, InMemoryMemoryStore, MemoryError, MemoryErrorKind,
    MemoryQueryResult, MemoryRecord, MemoryStore, MemoryStoreConfig, MemoryWriteQueue,
    OperationFailure, PendingOperationBatch, SaveInformation, SaveReference, SemanticMemory,
    SqliteMemoryStore, TextEmbedder, create_memory_store,
};
pub use kobserve::{
    MetricsObservabilityHooks, SafeBatchHooks, SafeChatTurnHooks, SafeSessionHooks,
    TracingObservabilityHooks, init_tracing,
};
pub use kprovider::{
    AiSettings, ClientConfig, ClientFactory, ImageOptions, ImageRef, PlatformSelector,
    ProviderClient, ProviderError, ProviderErrorKind, ProviderFuture, Purpose, SecretString,
    WireStyle,
};
#[cfg(feature = "http")]
pub use kprovider::{HttpClientFactory, HttpProviderClient};
pub use ksession::{
    Argument, Arguments, CancellationToken, InvocationError, InvocationErrorKind, InvokeOptions,
    PlatformTable, PromptFunction, PromptTemplate, Session, SessionError, SessionErrorKind,
    SessionFactory, SessionFactoryBuilder, SessionHooks, SessionKey, SessionRequest, SessionStore,
};

#[cfg(feature = "http")]
pub use runtime::{
    build_runtime, build_runtime_from_env, build_runtime_with_client, http_client_factory,
};
pub use runtime::{
    RuntimeBundle, build_runtime_with, embedding_memory, in_memory_history,
    in_memory_memory_store,
};
pub use util::{information, parse_platform, parse_purpose, reference, session_request, turn};
