//! Provider client boundary shared by every backend.
//!
//! ```rust
//! use kcommon::GenerationOptions;
//! use kprovider::{ImageOptions, ImageRef, PlatformSelector, ProviderClient, ProviderError, ProviderFuture};
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! impl ProviderClient for Echo {
//!     fn platform(&self) -> PlatformSelector {
//!         PlatformSelector::OpenAi
//!     }
//!
//!     fn complete<'a>(
//!         &'a self,
//!         prompt: String,
//!         _options: GenerationOptions,
//!     ) -> ProviderFuture<'a, Result<String, ProviderError>> {
//!         Box::pin(async move { Ok(prompt) })
//!     }
//!
//!     fn embed<'a>(&'a self, _text: String) -> ProviderFuture<'a, Result<Vec<f32>, ProviderError>> {
//!         Box::pin(async { Ok(vec![1.0, 0.0]) })
//!     }
//!
//!     fn generate_image<'a>(
//!         &'a self,
//!         _prompt: String,
//!         _options: ImageOptions,
//!     ) -> ProviderFuture<'a, Result<ImageRef, ProviderError>> {
//!         Box::pin(async { Ok(ImageRef::Url("https://example.test/cat.png".to_string())) })
//!     }
//! }
//!
//! let client = Echo;
//! assert_eq!(client.platform(), PlatformSelector::OpenAi);
//! ```

use kcommon::{BoxFuture, GenerationOptions};

use crate::{PlatformSelector, ProviderError};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl ImageOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size string in the `{width}x{height}` form image endpoints expect.
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    Base64(String),
}

pub trait ProviderClient: Send + Sync + std::fmt::Debug {
    fn platform(&self) -> PlatformSelector;

    fn complete<'a>(
        &'a self,
        prompt: String,
        options: GenerationOptions,
    ) -> ProviderFuture<'a, Result<String, ProviderError>>;

    fn embed<'a>(&'a self, text: String) -> ProviderFuture<'a, Result<Vec<f32>, ProviderError>>;

    fn generate_image<'a>(
        &'a self,
        prompt: String,
        options: ImageOptions,
    ) -> ProviderFuture<'a, Result<ImageRef, ProviderError>>;
}
