//! Runtime wiring helpers for sessions, chat and memory.

use std::sync::Arc;

use crate::{
    AiSettings, ChatOrchestrator, ClientFactory, HistoryStore, InMemoryHistoryStore,
    InMemoryMemoryStore, MemoryStore, MemoryWriteQueue, PendingOperationBatch, SafeBatchHooks,
    SafeChatTurnHooks, SafeSessionHooks, SemanticMemory, SessionError, SessionFactory,
    SessionRequest, TracingObservabilityHooks,
};

/// Everything an application needs to run chat turns with memory writes.
#[derive(Clone)]
pub struct RuntimeBundle {
    pub sessions: Arc<SessionFactory>,
    pub chat: Arc<ChatOrchestrator>,
    pub memory: MemoryWriteQueue,
}

impl RuntimeBundle {
    /// Waits for every queued memory write across the bundle.
    pub async fn join_pending(&self) -> Result<crate::BatchReport, crate::BatchError> {
        self.memory.join().await
    }
}

pub fn in_memory_history() -> Arc<dyn HistoryStore> {
    Arc::new(InMemoryHistoryStore::new())
}

pub fn in_memory_memory_store() -> Arc<dyn MemoryStore> {
    Arc::new(InMemoryMemoryStore::new())
}

/// Builds a [`SemanticMemory`] whose embeddings come from the session `request` resolves to.
pub fn embedding_memory(
    sessions: &SessionFactory,
    request: SessionRequest,
    store: Arc<dyn MemoryStore>,
) -> Result<SemanticMemory, SessionError> {
    let session = sessions.get_session(request.purpose(crate::Purpose::Embedding))?;
    Ok(SemanticMemory::new(store).with_embedder(session))
}

/// Wires a session factory, chat orchestrator and memory queue with tracing hooks.
///
/// The memory queue has no embedder; use [`embedding_memory`] and
/// [`MemoryWriteQueue::with_batch`] to attach one.
pub fn build_runtime_with(
    settings: AiSettings,
    clients: Arc<dyn ClientFactory>,
    history: Arc<dyn HistoryStore>,
    memory_store: Arc<dyn MemoryStore>,
) -> RuntimeBundle {
    let hooks = TracingObservabilityHooks;

    let sessions = SessionFactory::builder(clients)
        .settings(settings)
        .hooks(Arc::new(SafeSessionHooks::new(hooks)))
        .build();

    let batch = PendingOperationBatch::new().with_hooks(Arc::new(SafeBatchHooks::new(hooks)));
    let memory = MemoryWriteQueue::with_batch(SemanticMemory::new(memory_store), Arc::new(batch));

    let chat = ChatOrchestrator::builder(history)
        .memory(memory.clone())
        .hooks(Arc::new(SafeChatTurnHooks::new(hooks)))
        .build();

    RuntimeBundle {
        sessions: Arc::new(sessions),
        chat: Arc::new(chat),
        memory,
    }
}

#[cfg(feature = "http")]
pub fn http_client_factory() -> Arc<dyn ClientFactory> {
    Arc::new(crate::HttpClientFactory::new())
}

/// In-memory runtime talking to real provider endpoints over HTTP.
#[cfg(feature = "http")]
pub fn build_runtime(settings: AiSettings) -> RuntimeBundle {
    build_runtime_with(
        settings,
        http_client_factory(),
        in_memory_history(),
        in_memory_memory_store(),
    )
}

/// Same as [`build_runtime`], sending every provider request through `client`, for callers
/// that share proxies, TLS roots or connection pools with the rest of their application.
#[cfg(feature = "http")]
pub fn build_runtime_with_client(settings: AiSettings, client: reqwest::Client) -> RuntimeBundle {
    build_runtime_with(
        settings,
        Arc::new(crate::HttpClientFactory::with_client(client)),
        in_memory_history(),
        in_memory_memory_store(),
    )
}

/// Same as [`build_runtime`], reading settings from `KESTREL_*` environment variables.
#[cfg(feature = "http")]
pub fn build_runtime_from_env() -> Result<RuntimeBundle, crate::ProviderError> {
    Ok(build_runtime(AiSettings::from_env()?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        AiSettings, ClientConfig, GenerationOptions, ImageOptions, ImageRef, PlatformSelector,
        ProviderClient, ProviderError, ProviderFuture, Purpose, SessionRequest,
    };

    use super::{build_runtime_with, embedding_memory, in_memory_history, in_memory_memory_store};

    #[derive(Debug)]
    struct LengthClient;

    impl ProviderClient for LengthClient {
        fn platform(&self) -> PlatformSelector {
            PlatformSelector::Ollama
        }

        fn complete<'a>(
            &'a self,
            prompt: String,
            _options: GenerationOptions,
        ) -> ProviderFuture<'a, Result<String, ProviderError>> {
            Box::pin(async move { Ok(prompt.len().to_string()) })
        }

        fn embed<'a>(&'a self, text: String) -> ProviderFuture<'a, Result<Vec<f32>, ProviderError>> {
            Box::pin(async move { Ok(vec![text.len() as f32, 1.0]) })
        }

        fn generate_image<'a>(
            &'a self,
            _prompt: String,
            _options: ImageOptions,
        ) -> ProviderFuture<'a, Result<ImageRef, ProviderError>> {
            Box::pin(async { Err(ProviderError::invalid_request("no images")) })
        }
    }

    fn clients() -> Arc<dyn crate::ClientFactory> {
        Arc::new(
            |_config: &ClientConfig| -> Result<Arc<dyn ProviderClient>, ProviderError> {
                Ok(Arc::new(LengthClient))
            },
        )
    }

    #[test]
    fn runtime_shares_one_batch_between_chat_and_memory() {
        let runtime = build_runtime_with(
            AiSettings::new(PlatformSelector::Ollama),
            clients(),
            in_memory_history(),
            in_memory_memory_store(),
        );

        let chat_queue = runtime.chat.memory().expect("chat has a memory queue");
        assert!(Arc::ptr_eq(chat_queue.batch(), runtime.memory.batch()));
        assert!(!runtime.memory.memory().has_embedder());
    }

    #[cfg(feature = "http")]
    #[test]
    fn shared_reqwest_clients_back_real_sessions() {
        let runtime = super::build_runtime_with_client(
            AiSettings::new(PlatformSelector::OpenAi).with_api_key("sk-test"),
            reqwest::Client::new(),
        );

        let session = runtime
            .sessions
            .get_session(runtime.sessions.request("u1", "gpt-4o-mini"))
            .expect("http session");
        assert_eq!(session.platform(), PlatformSelector::OpenAi);
        assert_eq!(session.config().endpoint, "https://api.openai.com/v1");
    }

    #[test]
    fn embedding_memory_forces_the_embedding_purpose() {
        let runtime = build_runtime_with(
            AiSettings::new(PlatformSelector::Ollama),
            clients(),
            in_memory_history(),
            in_memory_memory_store(),
        );

        let memory = embedding_memory(
            &runtime.sessions,
            SessionRequest::new(PlatformSelector::Ollama, "u1", "nomic-embed-text"),
            in_memory_memory_store(),
        )
        .expect("embedding session");

        assert!(memory.has_embedder());
        let keys = runtime.sessions.cached_keys().expect("keys");
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].purpose, Purpose::Embedding);
    }
}
