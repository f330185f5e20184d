//! Chat defaults and per-turn requests.

use kcommon::{ConversationKey, GenerationOptions};
use ksession::InvokeOptions;

use crate::TranscriptMarkers;

pub const DEFAULT_HISTORY_ARG: &str = "history";
pub const DEFAULT_HUMAN_INPUT_ARG: &str = "human_input";
pub const DEFAULT_CHAT_PLUGIN: &str = "ChatPlugin";
pub const DEFAULT_CHAT_FUNCTION: &str = "Chat";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Ignored when `prompt_template` is set.
    pub system_message: Option<String>,
    pub prompt_template: Option<String>,
    pub markers: TranscriptMarkers,
    pub history_arg: String,
    pub human_input_arg: String,
    pub plugin_name: String,
    pub function_name: String,
    /// Written to the session temp store; `None` leaves history untrimmed.
    pub max_history_turns: Option<usize>,
    pub generation: GenerationOptions,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_message: None,
            prompt_template: None,
            markers: TranscriptMarkers::default(),
            history_arg: DEFAULT_HISTORY_ARG.to_string(),
            human_input_arg: DEFAULT_HUMAN_INPUT_ARG.to_string(),
            plugin_name: DEFAULT_CHAT_PLUGIN.to_string(),
            function_name: DEFAULT_CHAT_FUNCTION.to_string(),
            max_history_turns: None,
            generation: GenerationOptions::default(),
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    pub fn with_markers(mut self, markers: TranscriptMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_argument_names(
        mut self,
        history_arg: impl Into<String>,
        human_input_arg: impl Into<String>,
    ) -> Self {
        self.history_arg = history_arg.into();
        self.human_input_arg = human_input_arg.into();
        self
    }

    pub fn with_function(mut self, plugin: impl Into<String>, name: impl Into<String>) -> Self {
        self.plugin_name = plugin.into();
        self.function_name = name.into();
        self
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = Some(turns);
        self
    }

    pub fn with_generation_options(mut self, options: GenerationOptions) -> Self {
        self.generation = options;
        self
    }

    /// The configured template, or system message, history, human input and an open robot line.
    pub fn prompt_template(&self) -> String {
        if let Some(template) = &self.prompt_template {
            return template.clone();
        }

        let robot = &self.markers.robot_id;
        let system = self.system_message.clone().unwrap_or_else(|| {
            format!(
                "{robot} can have a conversation with you about any topic. It can give explicit \
                 instructions or say 'I don't know' if it does not know the answer."
            )
        });
        format!(
            "{system}\n\n{{{{${history}}}}}\n{human}: {{{{${input}}}}}\n{robot}:",
            history = self.history_arg,
            human = self.markers.human_id,
            input = self.human_input_arg,
        )
    }

    /// A turn request using this configuration's names and markers.
    pub fn turn(&self, conversation: impl Into<ConversationKey>, input: impl Into<String>) -> ChatTurnRequest {
        ChatTurnRequest {
            history_arg: self.history_arg.clone(),
            human_input_arg: self.human_input_arg.clone(),
            markers: self.markers.clone(),
            plugin_name: self.plugin_name.clone(),
            function_name: self.function_name.clone(),
            ..ChatTurnRequest::new(conversation, input)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatTurnRequest {
    pub conversation_key: ConversationKey,
    pub input: String,
    pub history_arg: String,
    pub human_input_arg: String,
    /// Falls back to the session temp store; absent in both means no trimming.
    pub max_history_turns: Option<usize>,
    pub markers: TranscriptMarkers,
    pub plugin_name: String,
    pub function_name: String,
    pub invoke_options: InvokeOptions,
    /// Saves the finished turn into this memory collection as a pending operation.
    pub memory_collection: Option<String>,
    pub wait_for_pending: bool,
}

impl ChatTurnRequest {
    pub fn new(conversation: impl Into<ConversationKey>, input: impl Into<String>) -> Self {
        Self {
            conversation_key: conversation.into(),
            input: input.into(),
            history_arg: DEFAULT_HISTORY_ARG.to_string(),
            human_input_arg: DEFAULT_HUMAN_INPUT_ARG.to_string(),
            max_history_turns: None,
            markers: TranscriptMarkers::default(),
            plugin_name: DEFAULT_CHAT_PLUGIN.to_string(),
            function_name: DEFAULT_CHAT_FUNCTION.to_string(),
            invoke_options: InvokeOptions::default(),
            memory_collection: None,
            wait_for_pending: false,
        }
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = Some(turns);
        self
    }

    pub fn with_markers(mut self, markers: TranscriptMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_argument_names(
        mut self,
        history_arg: impl Into<String>,
        human_input_arg: impl Into<String>,
    ) -> Self {
        self.history_arg = history_arg.into();
        self.human_input_arg = human_input_arg.into();
        self
    }

    pub fn with_function(mut self, plugin: impl Into<String>, name: impl Into<String>) -> Self {
        self.plugin_name = plugin.into();
        self.function_name = name.into();
        self
    }

    pub fn with_invoke_options(mut self, options: InvokeOptions) -> Self {
        self.invoke_options = options;
        self
    }

    pub fn with_memory_collection(mut self, collection: impl Into<String>) -> Self {
        self.memory_collection = Some(collection.into());
        self
    }

    /// Joins the memory batch before the turn returns.
    pub fn wait_for_pending(mut self) -> Self {
        self.wait_for_pending = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnResult {
    pub conversation_key: ConversationKey,
    pub output: String,
    pub transcript: String,
    pub turns_removed: usize,
}
