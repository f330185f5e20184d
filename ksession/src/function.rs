//! Prompt functions and the per-session function registry.
//!
//! ```rust
//! use kcommon::GenerationOptions;
//! use ksession::{FunctionRegistry, PromptFunction};
//!
//! let function = PromptFunction::new("Summarize", "Writer", "Summarize: {{$input}}")
//!     .with_description("Condenses the input")
//!     .with_options(GenerationOptions::default().with_max_tokens(200));
//!
//! let mut registry = FunctionRegistry::new();
//! registry.register(function);
//!
//! assert!(registry.get("Writer", "Summarize").is_some());
//! assert_eq!(registry.qualified_names(), vec!["Writer.Summarize".to_string()]);
//! ```

use std::sync::Arc;

use kcommon::{GenerationOptions, Registry};

use crate::PromptTemplate;

pub const DEFAULT_PLUGIN_NAME: &str = "_GLOBAL_FUNCTIONS_";

#[derive(Debug, Clone, PartialEq)]
pub struct PromptFunction {
    pub name: String,
    pub plugin: String,
    pub description: Option<String>,
    pub template: PromptTemplate,
    pub options: GenerationOptions,
}

impl PromptFunction {
    pub fn new(
        name: impl Into<String>,
        plugin: impl Into<String>,
        template: impl Into<PromptTemplate>,
    ) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            description: None,
            template: template.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(&self.plugin, &self.name)
    }
}

pub fn qualified_name(plugin: &str, name: &str) -> String {
    format!("{plugin}.{name}")
}

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: Registry<String, Arc<PromptFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function`, returning the definition it replaced.
    pub fn register(
        &mut self,
        function: impl Into<Arc<PromptFunction>>,
    ) -> Option<Arc<PromptFunction>> {
        let function = function.into();
        self.functions.insert(function.qualified_name(), function)
    }

    pub fn get(&self, plugin: &str, name: &str) -> Option<Arc<PromptFunction>> {
        self.functions.get(&qualified_name(plugin, name)).cloned()
    }

    pub fn remove(&mut self, plugin: &str, name: &str) -> Option<Arc<PromptFunction>> {
        self.functions.remove(&qualified_name(plugin, name))
    }

    pub fn qualified_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FunctionRegistry, PromptFunction};

    #[test]
    fn registering_same_name_replaces_previous_definition() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.register(PromptFunction::new("Chat", "Chat", "v1")).is_none());

        let replaced = registry
            .register(PromptFunction::new("Chat", "Chat", "v2"))
            .expect("previous definition should be returned");
        assert_eq!(replaced.template.source(), "v1");

        let current = registry.get("Chat", "Chat").expect("function should exist");
        assert_eq!(current.template.source(), "v2");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn functions_are_scoped_by_plugin() {
        let mut registry = FunctionRegistry::new();
        registry.register(PromptFunction::new("Run", "A", "a"));
        registry.register(PromptFunction::new("Run", "B", "b"));

        assert_eq!(registry.qualified_names(), vec!["A.Run", "B.Run"]);
        assert!(registry.remove("A", "Run").is_some());
        assert!(registry.get("A", "Run").is_none());
        assert!(registry.get("B", "Run").is_some());
    }
}
