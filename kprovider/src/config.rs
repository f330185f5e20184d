//! Concrete per-session client configuration and the factory seam that turns it into a client.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    PlatformSelector, ProviderClient, ProviderError, Purpose, SecretString, WireStyle,
    credentials::DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Everything a client needs to reach one backend for one model and purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub platform: PlatformSelector,
    pub purpose: Purpose,
    pub model: String,
    pub endpoint: String,
    pub wire_style: WireStyle,
    pub api_key: Option<SecretString>,
    pub organization_id: Option<String>,
    pub api_version: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        platform: PlatformSelector,
        purpose: Purpose,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        wire_style: WireStyle,
    ) -> Self {
        Self {
            platform,
            purpose,
            model: model.into(),
            endpoint: endpoint.into(),
            wire_style,
            api_key: None,
            organization_id: None,
            api_version: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_organization_id(mut self, organization_id: Option<String>) -> Self {
        self.organization_id = organization_id;
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &ClientConfig) -> Result<Arc<dyn ProviderClient>, ProviderError>;
}

impl<F> ClientFactory for F
where
    F: Fn(&ClientConfig) -> Result<Arc<dyn ProviderClient>, ProviderError> + Send + Sync,
{
    fn build(&self, config: &ClientConfig) -> Result<Arc<dyn ProviderClient>, ProviderError> {
        self(config)
    }
}
