use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use kcommon::{BoxFuture, ConversationKey, GenerationOptions};
use kchat::{
    ChatConfig, ChatErrorKind, ChatOrchestrator, ChatTurnRequest, HistoryStore,
    InMemoryHistoryStore,
};
use kmemory::{
    InMemoryMemoryStore, MemoryError, MemoryRecord, MemoryStore, MemoryWriteQueue, SemanticMemory,
};
use kprovider::{
    AiSettings, ClientConfig, ImageOptions, ImageRef, PlatformSelector, ProviderClient,
    ProviderError, ProviderErrorKind, ProviderFuture,
};
use ksession::{Session, SessionFactory};

#[derive(Debug, Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn replying(replies: Vec<Result<&str, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|reply| reply.map(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

impl ProviderClient for ScriptedClient {
    fn platform(&self) -> PlatformSelector {
        PlatformSelector::OpenAi
    }

    fn complete<'a>(
        &'a self,
        prompt: String,
        _options: GenerationOptions,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            self.prompts.lock().expect("prompts lock").push(prompt);
            self.replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("script exhausted")))
        })
    }

    fn embed<'a>(&'a self, _text: String) -> ProviderFuture<'a, Result<Vec<f32>, ProviderError>> {
        Box::pin(async { Ok(vec![1.0, 0.0]) })
    }

    fn generate_image<'a>(
        &'a self,
        _prompt: String,
        _options: ImageOptions,
    ) -> ProviderFuture<'a, Result<ImageRef, ProviderError>> {
        Box::pin(async { Err(ProviderError::other("image unused")) })
    }
}

#[derive(Debug, Default)]
struct ReadOnlyStore;

impl MemoryStore for ReadOnlyStore {
    fn upsert<'a>(&'a self, _record: MemoryRecord) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async { Err(MemoryError::storage("memory is read-only")) })
    }

    fn get<'a>(
        &'a self,
        _collection: &'a str,
        _id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MemoryRecord>, MemoryError>> {
        Box::pin(async { Ok(None) })
    }

    fn list<'a>(
        &'a self,
        _collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MemoryRecord>, MemoryError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn remove<'a>(
        &'a self,
        _collection: &'a str,
        _id: &'a str,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async { Ok(false) })
    }

    fn collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, MemoryError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

fn factory_for(client: Arc<ScriptedClient>) -> SessionFactory {
    let clients = move |_config: &ClientConfig| -> Result<Arc<dyn ProviderClient>, ProviderError> {
        Ok(Arc::clone(&client) as Arc<dyn ProviderClient>)
    };
    SessionFactory::new(
        AiSettings::new(PlatformSelector::OpenAi).with_api_key("sk-test"),
        Arc::new(clients),
    )
}

fn chat_session(
    orchestrator: &ChatOrchestrator,
    client: Arc<ScriptedClient>,
    config: &ChatConfig,
) -> Arc<Session> {
    let factory = factory_for(client);
    orchestrator
        .configure_chat(&factory, factory.request("jeffrey", "gpt-4o-mini"), config)
        .expect("chat configured")
}

async fn stored_transcript(history: &InMemoryHistoryStore, key: &str) -> Option<String> {
    history
        .load(&ConversationKey::from(key))
        .await
        .expect("history readable")
        .text("history")
}

#[tokio::test]
async fn first_turn_starts_the_transcript() {
    let client = ScriptedClient::replying(vec![Ok("4")]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let orchestrator = ChatOrchestrator::new(Arc::clone(&history) as Arc<dyn HistoryStore>);
    let config = ChatConfig::new().with_system_message("You are terse.");
    let session = chat_session(&orchestrator, Arc::clone(&client), &config);

    let result = orchestrator
        .chat_turn(&session, config.turn("c-1", "What's 2+2?"))
        .await
        .expect("turn succeeds");

    assert_eq!(result.output, "4");
    assert_eq!(result.transcript, "Human: What's 2+2?\nChatBot: 4");
    assert_eq!(result.turns_removed, 0);
    assert_eq!(
        client.prompts(),
        vec!["You are terse.\n\n\nHuman: What's 2+2?\nChatBot:".to_string()]
    );
    assert_eq!(
        stored_transcript(&history, "c-1").await.as_deref(),
        Some("Human: What's 2+2?\nChatBot: 4")
    );
}

#[tokio::test]
async fn session_cap_trims_the_oldest_turns() {
    let client = ScriptedClient::replying(vec![Ok("a1"), Ok("a2"), Ok("a3")]);
    let orchestrator = ChatOrchestrator::new(Arc::new(InMemoryHistoryStore::new()));
    let config = ChatConfig::new().with_max_history_turns(2);
    let session = chat_session(&orchestrator, Arc::clone(&client), &config);
    assert_eq!(session.max_history_count().expect("temp store"), Some(2));

    for question in ["q1", "q2"] {
        orchestrator
            .chat_turn(&session, config.turn("c-1", question))
            .await
            .expect("turn succeeds");
    }
    let third = orchestrator
        .chat_turn(&session, config.turn("c-1", "q3"))
        .await
        .expect("turn succeeds");

    assert_eq!(third.transcript, "Human: q2\nChatBot: a2\nHuman: q3\nChatBot: a3");
    assert_eq!(third.turns_removed, 1);
    assert!(client.prompts()[2].contains("Human: q1\nChatBot: a1\nHuman: q2\nChatBot: a2"));
}

#[tokio::test]
async fn replies_that_invent_the_next_question_stay_bounded() {
    let client = ScriptedClient::replying(vec![Ok("sure\nHuman: and then?"); 6]);
    let orchestrator = ChatOrchestrator::new(Arc::new(InMemoryHistoryStore::new()));
    let config = ChatConfig::new().with_max_history_turns(1);
    let session = chat_session(&orchestrator, client, &config);

    let mut lengths = Vec::new();
    let mut last = None;
    for question in ["q1", "q2", "q3", "q4", "q5", "q6"] {
        let result = orchestrator
            .chat_turn(&session, config.turn("c-1", question))
            .await
            .expect("turn succeeds");
        lengths.push(result.transcript.len());
        last = Some(result);
    }

    let last = last.expect("six turns ran");
    assert_eq!(
        last.transcript,
        "Human: and then?\nHuman: q6\nChatBot: sure\nHuman: and then?"
    );
    assert!(lengths[1..].windows(2).all(|pair| pair[0] == pair[1]), "{lengths:?}");
}

#[tokio::test]
async fn history_grows_unbounded_without_a_cap() {
    let client = ScriptedClient::replying(vec![Ok("a1"), Ok("a2"), Ok("a3")]);
    let orchestrator = ChatOrchestrator::new(Arc::new(InMemoryHistoryStore::new()));
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, client, &config);

    let mut last = None;
    for question in ["q1", "q2", "q3"] {
        last = Some(
            orchestrator
                .chat_turn(&session, config.turn("c-1", question))
                .await
                .expect("turn succeeds"),
        );
    }

    let last = last.expect("three turns ran");
    assert_eq!(kchat::count_turns(&last.transcript, &Default::default()), 3);
    assert_eq!(last.turns_removed, 0);
}

#[tokio::test]
async fn a_zero_cap_still_keeps_the_newest_turn() {
    let client = ScriptedClient::replying(vec![Ok("a1"), Ok("a2")]);
    let orchestrator = ChatOrchestrator::new(Arc::new(InMemoryHistoryStore::new()));
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, client, &config);

    orchestrator
        .chat_turn(&session, config.turn("c-1", "q1"))
        .await
        .expect("turn succeeds");
    let result = orchestrator
        .chat_turn(&session, config.turn("c-1", "q2").with_max_history_turns(0))
        .await
        .expect("turn succeeds");

    assert_eq!(result.transcript, "Human: q2\nChatBot: a2");
}

#[tokio::test]
async fn failed_invocation_leaves_the_transcript_untouched() {
    let client = ScriptedClient::replying(vec![
        Ok("hello"),
        Err(ProviderError::rate_limited("quota exhausted")),
    ]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let orchestrator = ChatOrchestrator::new(Arc::clone(&history) as Arc<dyn HistoryStore>);
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, client, &config);

    orchestrator
        .chat_turn(&session, config.turn("c-1", "hi"))
        .await
        .expect("first turn succeeds");
    let before = stored_transcript(&history, "c-1").await;

    let error = orchestrator
        .chat_turn(&session, config.turn("c-1", "bye"))
        .await
        .expect_err("provider failure must surface");

    assert_eq!(error.kind, ChatErrorKind::Invocation);
    assert_eq!(
        error.provider_cause().map(|cause| cause.kind),
        Some(ProviderErrorKind::RateLimited)
    );
    assert_eq!(stored_transcript(&history, "c-1").await, before);
}

#[tokio::test]
async fn blank_input_never_reaches_the_provider() {
    let client = ScriptedClient::replying(vec![Ok("unused")]);
    let orchestrator = ChatOrchestrator::new(Arc::new(InMemoryHistoryStore::new()));
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, Arc::clone(&client), &config);

    let error = orchestrator
        .chat_turn(&session, config.turn("c-1", "  \n"))
        .await
        .expect_err("blank input must fail");

    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn completed_turns_are_saved_to_memory_when_requested() {
    let client = ScriptedClient::replying(vec![Ok("Paris")]);
    let memory = SemanticMemory::new(Arc::new(InMemoryMemoryStore::new()));
    let orchestrator = ChatOrchestrator::builder(Arc::new(InMemoryHistoryStore::new()))
        .memory(MemoryWriteQueue::new(memory.clone()))
        .build();
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, client, &config);

    orchestrator
        .chat_turn(
            &session,
            config
                .turn("c-1", "Capital of France?")
                .with_memory_collection("chat-log")
                .wait_for_pending(),
        )
        .await
        .expect("turn succeeds");

    let records = memory
        .store()
        .list("chat-log")
        .await
        .expect("memory readable");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "Human: Capital of France?\nChatBot: Paris");
}

#[tokio::test]
async fn memory_failures_surface_as_batch_errors_after_the_turn_is_stored() {
    let client = ScriptedClient::replying(vec![Ok("Paris")]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let orchestrator = ChatOrchestrator::builder(Arc::clone(&history) as Arc<dyn HistoryStore>)
        .memory(MemoryWriteQueue::new(SemanticMemory::new(Arc::new(ReadOnlyStore))))
        .build();
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, client, &config);

    let error = orchestrator
        .chat_turn(
            &session,
            config
                .turn("c-1", "Capital of France?")
                .with_memory_collection("chat-log")
                .wait_for_pending(),
        )
        .await
        .expect_err("memory write fails");

    assert_eq!(error.kind, ChatErrorKind::Batch);
    assert_eq!(error.batch_error().map(|batch| batch.failures.len()), Some(1));
    assert_eq!(
        stored_transcript(&history, "c-1").await.as_deref(),
        Some("Human: Capital of France?\nChatBot: Paris")
    );
    assert!(orchestrator.memory().expect("queue attached").batch().is_empty());
}

#[tokio::test]
async fn memory_collection_without_a_queue_is_rejected_up_front() {
    let client = ScriptedClient::replying(vec![Ok("unused")]);
    let orchestrator = ChatOrchestrator::new(Arc::new(InMemoryHistoryStore::new()));
    let config = ChatConfig::new();
    let session = chat_session(&orchestrator, Arc::clone(&client), &config);

    let error = orchestrator
        .chat_turn(
            &session,
            ChatTurnRequest::new("c-1", "hi").with_memory_collection("chat-log"),
        )
        .await
        .expect_err("no queue attached");

    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert!(client.prompts().is_empty());
}
