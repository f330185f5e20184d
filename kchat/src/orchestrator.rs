//! One chat turn: read the transcript, invoke the session, append, trim, write back.
//!
//! Turns for the same conversation key must be serialized by the caller; two concurrent
//! turns on one key race on the stored transcript and one update can be lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use kmemory::{BatchReport, MemoryWriteQueue, SaveInformation};
use ksession::{Session, SessionFactory, SessionRequest};

use crate::{
    ChatConfig, ChatError, ChatTurnHooks, ChatTurnRequest, ChatTurnResult, HistoryStore,
    NoopChatTurnHooks, TranscriptMarkers, TrimOutcome, count_turns, trim_history,
};

pub struct ChatOrchestratorBuilder {
    history: Arc<dyn HistoryStore>,
    memory: Option<MemoryWriteQueue>,
    hooks: Arc<dyn ChatTurnHooks>,
}

impl ChatOrchestratorBuilder {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self {
            history,
            memory: None,
            hooks: Arc::new(NoopChatTurnHooks),
        }
    }

    pub fn memory(mut self, memory: MemoryWriteQueue) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatTurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> ChatOrchestrator {
        ChatOrchestrator {
            history: self.history,
            memory: self.memory,
            hooks: self.hooks,
            next_memory_id: AtomicU64::new(1),
        }
    }
}

pub struct ChatOrchestrator {
    history: Arc<dyn HistoryStore>,
    memory: Option<MemoryWriteQueue>,
    hooks: Arc<dyn ChatTurnHooks>,
    next_memory_id: AtomicU64,
}

impl ChatOrchestrator {
    pub fn builder(history: Arc<dyn HistoryStore>) -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::new(history)
    }

    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self::builder(history).build()
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn memory(&self) -> Option<&MemoryWriteQueue> {
        self.memory.as_ref()
    }

    /// Builds or reuses the session, registers the chat function and records the history cap.
    pub fn configure_chat(
        &self,
        factory: &SessionFactory,
        request: SessionRequest,
        config: &ChatConfig,
    ) -> Result<Arc<Session>, ChatError> {
        let session = factory.get_session(request)?;
        session.create_function_from_prompt(
            config.prompt_template(),
            config.function_name.clone(),
            config.plugin_name.clone(),
            config.generation.clone(),
        )?;
        session.set_max_history_count(config.max_history_turns)?;
        Ok(session)
    }

    /// Runs one turn. On failure the stored transcript is left exactly as it was.
    pub async fn chat_turn(
        &self,
        session: &Session,
        request: ChatTurnRequest,
    ) -> Result<ChatTurnResult, ChatError> {
        let started = Instant::now();
        let conversation = request.conversation_key.clone();
        self.hooks.on_turn_start(&conversation);

        match self.run_turn(session, request).await {
            Ok(result) => {
                self.hooks
                    .on_turn_success(&conversation, result.transcript.len(), started.elapsed());
                Ok(result)
            }
            Err(error) => {
                self.hooks
                    .on_turn_failure(&conversation, &error, started.elapsed());
                Err(error)
            }
        }
    }

    /// Waits for every memory write issued by earlier turns.
    pub async fn join_pending(&self) -> Result<BatchReport, ChatError> {
        match &self.memory {
            Some(memory) => Ok(memory.join().await?),
            None => Ok(BatchReport {
                completed: Vec::new(),
                elapsed: std::time::Duration::ZERO,
            }),
        }
    }

    async fn run_turn(
        &self,
        session: &Session,
        request: ChatTurnRequest,
    ) -> Result<ChatTurnResult, ChatError> {
        validate(&request)?;
        let memory = match &request.memory_collection {
            Some(_) => Some(self.memory.as_ref().ok_or_else(|| {
                ChatError::invalid_request(
                    "a memory collection was requested but no memory queue is attached",
                )
            })?),
            None => None,
        };

        let ChatTurnRequest {
            conversation_key,
            input,
            history_arg,
            human_input_arg,
            max_history_turns,
            markers,
            plugin_name,
            function_name,
            invoke_options,
            memory_collection,
            wait_for_pending,
        } = request;

        let mut arguments = self.history.load(&conversation_key).await?;
        let transcript = arguments.text(&history_arg).unwrap_or_default();
        arguments.set(history_arg.clone(), transcript.clone());
        arguments.set(human_input_arg, input.clone());

        let output = session
            .invoke_by_name(&plugin_name, &function_name, &arguments, invoke_options)
            .await?;

        let appended = append_turn(&transcript, &markers, &input, &output);
        let cap = match max_history_turns {
            Some(cap) => Some(cap),
            None => session.max_history_count()?,
        };
        let trimmed = match cap {
            Some(cap) => trim_history(&appended, &markers, cap.max(1)),
            None => TrimOutcome {
                turns: count_turns(&appended, &markers),
                transcript: appended,
                removed: 0,
            },
        };
        if trimmed.removed > 0 {
            self.hooks
                .on_history_trimmed(&conversation_key, trimmed.removed, trimmed.kept());
        }

        arguments.set(history_arg, trimmed.transcript.clone());
        self.history.save(&conversation_key, arguments).await?;

        if let (Some(memory), Some(collection)) = (memory, memory_collection) {
            let id = self.memory_id(&conversation_key.to_string());
            memory.save_information(
                SaveInformation::new(collection, markers.format_turn(&input, &output), id)
                    .with_description(format!("chat turn in {conversation_key}")),
            )?;
            if wait_for_pending {
                memory.join().await?;
            }
        }

        Ok(ChatTurnResult {
            conversation_key,
            output,
            transcript: trimmed.transcript,
            turns_removed: trimmed.removed,
        })
    }

    fn memory_id(&self, conversation: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let sequence = self.next_memory_id.fetch_add(1, Ordering::Relaxed);
        format!("{conversation}/{millis}-{sequence}")
    }
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

/// Appends a complete turn, separating it from existing text with a newline.
pub fn append_turn(transcript: &str, markers: &TranscriptMarkers, input: &str, output: &str) -> String {
    let turn = markers.format_turn(input, output);
    if transcript.is_empty() {
        return turn;
    }

    let mut appended = String::with_capacity(transcript.len() + turn.len() + 1);
    appended.push_str(transcript);
    if !transcript.ends_with('\n') {
        appended.push('\n');
    }
    appended.push_str(&turn);
    appended
}

fn validate(request: &ChatTurnRequest) -> Result<(), ChatError> {
    if request.input.trim().is_empty() {
        return Err(ChatError::invalid_request("chat input must not be empty"));
    }

    if request.history_arg.trim().is_empty() || request.human_input_arg.trim().is_empty() {
        return Err(ChatError::invalid_request(
            "history and human input argument names must not be empty",
        ));
    }

    if request.history_arg == request.human_input_arg {
        return Err(ChatError::invalid_request(
            "history and human input must use different argument names",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_adds_a_separator_only_when_needed() {
        let markers = TranscriptMarkers::default();
        assert_eq!(append_turn("", &markers, "a", "b"), "Human: a\nChatBot: b");
        assert_eq!(
            append_turn("Human: a\nChatBot: b", &markers, "c", "d"),
            "Human: a\nChatBot: b\nHuman: c\nChatBot: d"
        );
        assert_eq!(
            append_turn("notes\n", &markers, "c", "d"),
            "notes\nHuman: c\nChatBot: d"
        );
    }

    #[test]
    fn blank_input_is_rejected() {
        let error = validate(&ChatTurnRequest::new("c", "   ")).expect_err("blank input");
        assert_eq!(error.kind, crate::ChatErrorKind::InvalidRequest);
    }

    #[test]
    fn colliding_argument_names_are_rejected() {
        let request = ChatTurnRequest::new("c", "hi").with_argument_names("same", "same");
        assert!(validate(&request).is_err());
    }
}
