//! Common `kprovider` imports for downstream crates.

pub use crate::{
    AiSettings, ClientConfig, ClientFactory, ImageOptions, ImageRef, PlatformSelector,
    ProviderClient, ProviderError, ProviderErrorKind, ProviderFuture, Purpose, SecretString,
    WireStyle,
};
pub use kcommon::{BoxFuture, GenerationOptions};
