//! Session factory, cached sessions and prompt function invocation.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kprovider::{AiSettings, ClientConfig, PlatformSelector, ProviderClient, ProviderError, Purpose};
//! use ksession::{SessionErrorKind, SessionFactory, SessionRequest};
//!
//! let clients = |_config: &ClientConfig| -> Result<Arc<dyn ProviderClient>, ProviderError> {
//!     Err(ProviderError::unavailable("no network in doctests"))
//! };
//! let factory = SessionFactory::new(AiSettings::new(PlatformSelector::HuggingFace), Arc::new(clients));
//!
//! let request = SessionRequest::new(PlatformSelector::HuggingFace, "u1", "flux")
//!     .purpose(Purpose::Image);
//! let error = factory.get_session(request).expect_err("no image branch for huggingface");
//!
//! assert_eq!(error.kind, SessionErrorKind::UnsupportedPlatform);
//! assert!(factory.cached_keys().expect("store readable").is_empty());
//! ```

pub mod arguments;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod function;
pub mod hooks;
pub mod key;
pub mod session;
pub mod store;
pub mod temp_store;
pub mod template;

pub use arguments::{Argument, Arguments};
pub use dispatch::{Configurator, PlatformTable};
pub use error::{InvocationError, InvocationErrorKind, SessionError, SessionErrorKind};
pub use factory::{SessionFactory, SessionFactoryBuilder, SessionRequest};
pub use function::{FunctionRegistry, PromptFunction};
pub use hooks::{NoopSessionHooks, SessionHooks};
pub use key::SessionKey;
pub use session::{InvokeOptions, Session};
pub use store::{InMemorySessionStore, SessionStore};
pub use temp_store::{MAX_HISTORY_COUNT_KEY, TempStore};
pub use template::PromptTemplate;
pub use tokio_util::sync::CancellationToken;
