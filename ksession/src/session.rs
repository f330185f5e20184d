//! A configured backend connection plus its prompt functions and temp store.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kcommon::GenerationOptions;
//! use kprovider::{
//!     ClientConfig, ImageOptions, ImageRef, PlatformSelector, ProviderClient, ProviderError,
//!     ProviderFuture, Purpose, WireStyle,
//! };
//! use ksession::{Arguments, InvokeOptions, Session, SessionKey};
//!
//! #[derive(Debug)]
//! struct Shout;
//!
//! impl ProviderClient for Shout {
//!     fn platform(&self) -> PlatformSelector {
//!         PlatformSelector::OpenAi
//!     }
//!
//!     fn complete<'a>(
//!         &'a self,
//!         prompt: String,
//!         _options: GenerationOptions,
//!     ) -> ProviderFuture<'a, Result<String, ProviderError>> {
//!         Box::pin(async move { Ok(prompt.to_uppercase()) })
//!     }
//!
//!     fn embed<'a>(&'a self, _text: String) -> ProviderFuture<'a, Result<Vec<f32>, ProviderError>> {
//!         Box::pin(async { Ok(Vec::new()) })
//!     }
//!
//!     fn generate_image<'a>(
//!         &'a self,
//!         _prompt: String,
//!         _options: ImageOptions,
//!     ) -> ProviderFuture<'a, Result<ImageRef, ProviderError>> {
//!         Box::pin(async { Err(ProviderError::other("unused")) })
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let key = SessionKey::new(PlatformSelector::OpenAi, "u1", "gpt-4o-mini", Purpose::Completion);
//! let config = ClientConfig::new(
//!     key.platform,
//!     key.purpose,
//!     key.model.clone(),
//!     "https://api.openai.com/v1",
//!     WireStyle::Bearer,
//! );
//! let session = Session::new(key, config, Arc::new(Shout));
//!
//! let function = session
//!     .create_function_from_prompt("say {{$word}}", "Say", "Demo", GenerationOptions::default())
//!     .expect("function registered");
//! let output = session
//!     .invoke(&function, &Arguments::new().with("word", "hi"), InvokeOptions::default())
//!     .await
//!     .expect("invocation succeeds");
//!
//! assert_eq!(output, "SAY HI");
//! # });
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use kcommon::GenerationOptions;
use kprovider::{
    ClientConfig, ImageOptions, ImageRef, PlatformSelector, ProviderClient, ProviderError,
    ProviderFuture,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    Arguments, FunctionRegistry, InvocationError, MAX_HISTORY_COUNT_KEY, NoopSessionHooks,
    PromptFunction, PromptTemplate, SessionError, SessionHooks, SessionKey, TempStore,
    function::DEFAULT_PLUGIN_NAME,
};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Per-call controls for a provider invocation.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Falls back to the session's configured request timeout.
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
    /// Overrides the function's own options field by field.
    pub generation: Option<GenerationOptions>,
}

impl InvokeOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_generation_options(mut self, options: GenerationOptions) -> Self {
        self.generation = Some(options);
        self
    }
}

pub struct Session {
    instance_id: u64,
    key: SessionKey,
    config: ClientConfig,
    client: Arc<dyn ProviderClient>,
    functions: RwLock<FunctionRegistry>,
    temp_store: RwLock<TempStore>,
    hooks: Arc<dyn SessionHooks>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_id", &self.instance_id)
            .field("key", &self.key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(key: SessionKey, config: ClientConfig, client: Arc<dyn ProviderClient>) -> Self {
        Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            key,
            config,
            client,
            functions: RwLock::new(FunctionRegistry::new()),
            temp_store: RwLock::new(TempStore::new()),
            hooks: Arc::new(NoopSessionHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Unique per constructed session; a refreshed session gets a new id.
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn platform(&self) -> PlatformSelector {
        self.key.platform
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> Arc<dyn ProviderClient> {
        Arc::clone(&self.client)
    }

    /// Registers a prompt function, replacing any previous one with the same qualified name.
    /// An empty plugin name registers into the global plugin.
    pub fn create_function_from_prompt(
        &self,
        template: impl Into<String>,
        name: impl Into<String>,
        plugin: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<Arc<PromptFunction>, SessionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SessionError::invalid_configuration(
                "function name must not be empty",
            ));
        }

        let plugin = plugin.into();
        let plugin = if plugin.trim().is_empty() {
            DEFAULT_PLUGIN_NAME.to_string()
        } else {
            plugin
        };

        let template = PromptTemplate::new(template);
        let function = Arc::new(PromptFunction::new(name, plugin, template).with_options(options));
        self.write_functions()?.register(Arc::clone(&function));
        Ok(function)
    }

    pub fn register_function(
        &self,
        function: PromptFunction,
    ) -> Result<Option<Arc<PromptFunction>>, SessionError> {
        Ok(self.write_functions()?.register(function))
    }

    pub fn function(
        &self,
        plugin: &str,
        name: &str,
    ) -> Result<Option<Arc<PromptFunction>>, SessionError> {
        Ok(self.read_functions()?.get(plugin, name))
    }

    pub fn function_names(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.read_functions()?.qualified_names())
    }

    pub fn temp_value(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.read_temp_store()?.get(key).cloned())
    }

    pub fn set_temp_value(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, SessionError> {
        Ok(self.write_temp_store()?.set(key, value))
    }

    pub fn remove_temp_value(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.write_temp_store()?.remove(key))
    }

    pub fn max_history_count(&self) -> Result<Option<usize>, SessionError> {
        Ok(self.read_temp_store()?.get_usize(MAX_HISTORY_COUNT_KEY))
    }

    /// `None` clears the cap, which disables trimming for this session.
    pub fn set_max_history_count(&self, count: Option<usize>) -> Result<(), SessionError> {
        let mut store = self.write_temp_store()?;
        match count {
            Some(count) => {
                store.set(MAX_HISTORY_COUNT_KEY, count as u64);
            }
            None => {
                store.remove(MAX_HISTORY_COUNT_KEY);
            }
        }
        Ok(())
    }

    /// Renders the function's template with `arguments` and runs a completion.
    pub async fn invoke(
        &self,
        function: &PromptFunction,
        arguments: &Arguments,
        options: InvokeOptions,
    ) -> Result<String, InvocationError> {
        let prompt = function.template.render(arguments);
        let generation = options
            .generation
            .clone()
            .unwrap_or_default()
            .merged_with(&function.options);
        let operation = function.qualified_name();

        self.supervise(&operation, self.client.complete(prompt, generation), &options)
            .await
    }

    pub async fn invoke_by_name(
        &self,
        plugin: &str,
        name: &str,
        arguments: &Arguments,
        options: InvokeOptions,
    ) -> Result<String, InvocationError> {
        let function = self
            .function(plugin, name)
            .map_err(|err| InvocationError::internal(err.message))?
            .ok_or_else(|| {
                InvocationError::function_not_found(format!(
                    "function '{plugin}.{name}' is not registered on session {}",
                    self.key
                ))
            })?;

        self.invoke(&function, arguments, options).await
    }

    pub async fn embed(
        &self,
        text: impl Into<String>,
        options: InvokeOptions,
    ) -> Result<Vec<f32>, InvocationError> {
        self.supervise("embed", self.client.embed(text.into()), &options)
            .await
    }

    pub async fn generate_image(
        &self,
        prompt: impl Into<String>,
        image: ImageOptions,
        options: InvokeOptions,
    ) -> Result<ImageRef, InvocationError> {
        self.supervise(
            "generate_image",
            self.client.generate_image(prompt.into(), image),
            &options,
        )
        .await
    }

    async fn supervise<T>(
        &self,
        operation: &str,
        call: ProviderFuture<'_, Result<T, ProviderError>>,
        options: &InvokeOptions,
    ) -> Result<T, InvocationError> {
        let started = Instant::now();
        self.hooks.on_invocation_start(&self.key, operation);

        let outcome = self.run_with_limits(operation, call, options).await;
        match &outcome {
            Ok(_) => self
                .hooks
                .on_invocation_success(&self.key, operation, started.elapsed()),
            Err(error) => {
                self.hooks
                    .on_invocation_failure(&self.key, operation, error, started.elapsed())
            }
        }
        outcome
    }

    async fn run_with_limits<T>(
        &self,
        operation: &str,
        call: ProviderFuture<'_, Result<T, ProviderError>>,
        options: &InvokeOptions,
    ) -> Result<T, InvocationError> {
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let cancellation = options.cancellation.clone().unwrap_or_default();
        if cancellation.is_cancelled() {
            return Err(InvocationError::cancelled(format!(
                "{operation} was cancelled before it started"
            )));
        }

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(InvocationError::cancelled(format!(
                "{operation} was cancelled"
            ))),
            result = tokio::time::timeout(timeout, call) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(error)) => Err(InvocationError::from(error)),
                Err(_) => Err(InvocationError::timeout(format!(
                    "{operation} timed out after {}ms",
                    timeout.as_millis()
                ))),
            },
        }
    }

    fn read_functions(&self) -> Result<RwLockReadGuard<'_, FunctionRegistry>, SessionError> {
        self.functions
            .read()
            .map_err(|_| SessionError::storage("function registry lock poisoned"))
    }

    fn write_functions(&self) -> Result<RwLockWriteGuard<'_, FunctionRegistry>, SessionError> {
        self.functions
            .write()
            .map_err(|_| SessionError::storage("function registry lock poisoned"))
    }

    fn read_temp_store(&self) -> Result<RwLockReadGuard<'_, TempStore>, SessionError> {
        self.temp_store
            .read()
            .map_err(|_| SessionError::storage("temp store lock poisoned"))
    }

    fn write_temp_store(&self) -> Result<RwLockWriteGuard<'_, TempStore>, SessionError> {
        self.temp_store
            .write()
            .map_err(|_| SessionError::storage("temp store lock poisoned"))
    }
}
