//! Provider client boundary, platform selection and configuration surface.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use kprovider::{AiSettings, PlatformSelector};
//!
//! let settings = AiSettings::new(PlatformSelector::OpenAi)
//!     .with_api_key("sk-test")
//!     .with_organization_id("org-1")
//!     .with_request_timeout(Duration::from_secs(30));
//!
//! assert_eq!(settings.platform.to_string(), "openai");
//! assert_eq!(settings.request_timeout(), Duration::from_secs(30));
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod platform;
pub mod prelude;

#[cfg(feature = "http")]
pub mod http;

pub use client::{ImageOptions, ImageRef, ProviderClient, ProviderFuture};
pub use config::{ClientConfig, ClientFactory};
pub use credentials::{AiSettings, SecretString};
pub use error::{ProviderError, ProviderErrorKind};
pub use platform::{PlatformSelector, Purpose, WireStyle};

#[cfg(feature = "http")]
pub use http::{HttpClientFactory, HttpProviderClient};
