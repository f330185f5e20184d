//! Tracing and metrics implementations of the session, chat and batch hooks.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kmemory::{BatchHooks, PendingOperationBatch};
//! use kobserve::{MetricsObservabilityHooks, SafeSessionHooks, TracingObservabilityHooks};
//!
//! let _session_hooks = SafeSessionHooks::new(TracingObservabilityHooks);
//! let _batch = PendingOperationBatch::new()
//!     .with_hooks(Arc::new(MetricsObservabilityHooks) as Arc<dyn BatchHooks>);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod subscriber;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeBatchHooks, SafeChatTurnHooks, SafeSessionHooks};
pub use subscriber::init_tracing;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeBatchHooks, SafeChatTurnHooks, SafeSessionHooks,
        TracingObservabilityHooks, init_tracing,
    };
}
