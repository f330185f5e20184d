//! Redacting secret values and the platform settings surface.
//!
//! ```rust
//! use kprovider::{AiSettings, PlatformSelector};
//!
//! let settings = AiSettings::from_json_str(
//!     r#"{ "platform": "azure", "api_key": "key-1", "azure_endpoint": "https://contoso.openai.azure.com" }"#,
//! )
//! .expect("settings should parse");
//!
//! assert_eq!(settings.platform, PlatformSelector::AzureOpenAi);
//! assert_eq!(format!("{:?}", settings.api_key), "Some([REDACTED])");
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::{PlatformSelector, ProviderError};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

/// Read-only credential and endpoint configuration consumed when building sessions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub platform: PlatformSelector,
    pub api_key: Option<SecretString>,
    pub organization_id: Option<String>,
    pub azure_endpoint: Option<String>,
    pub azure_api_version: Option<String>,
    pub neuchar_endpoint: Option<String>,
    pub neuchar_api_version: Option<String>,
    pub huggingface_endpoint: Option<String>,
    pub ollama_endpoint: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            platform: PlatformSelector::default(),
            api_key: None,
            organization_id: None,
            azure_endpoint: None,
            azure_api_version: None,
            neuchar_endpoint: None,
            neuchar_api_version: None,
            huggingface_endpoint: None,
            ollama_endpoint: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AiSettings {
    pub fn new(platform: PlatformSelector) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(json)
            .map_err(|err| ProviderError::invalid_request(format!("invalid AI settings: {err}")))
    }

    /// Reads `KESTREL_*` environment variables; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();
        if let Some(platform) = read("KESTREL_AI_PLATFORM") {
            settings.platform = platform.parse()?;
        }

        settings.api_key = read("KESTREL_API_KEY").map(SecretString::new);
        settings.organization_id = read("KESTREL_ORGANIZATION_ID");
        settings.azure_endpoint = read("KESTREL_AZURE_ENDPOINT");
        settings.azure_api_version = read("KESTREL_AZURE_API_VERSION");
        settings.neuchar_endpoint = read("KESTREL_NEUCHAR_ENDPOINT");
        settings.neuchar_api_version = read("KESTREL_NEUCHAR_API_VERSION");
        settings.huggingface_endpoint = read("KESTREL_HUGGINGFACE_ENDPOINT");
        settings.ollama_endpoint = read("KESTREL_OLLAMA_ENDPOINT");

        if let Some(timeout) = read("KESTREL_REQUEST_TIMEOUT_SECS") {
            settings.request_timeout_secs = timeout.parse().map_err(|_| {
                ProviderError::invalid_request(format!(
                    "KESTREL_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }

        Ok(settings)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key));
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_azure(
        mut self,
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        self.azure_endpoint = Some(endpoint.into());
        self.azure_api_version = Some(api_version.into());
        self
    }

    pub fn with_neuchar(
        mut self,
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        self.neuchar_endpoint = Some(endpoint.into());
        self.neuchar_api_version = Some(api_version.into());
        self
    }

    pub fn with_huggingface_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.huggingface_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_ollama_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.ollama_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the API key when one is configured and non-blank.
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{AiSettings, SecretString};
    use crate::{PlatformSelector, ProviderErrorKind};

    #[test]
    fn secret_string_redacts_debug_output() {
        let secret = SecretString::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn settings_from_json_uses_defaults_for_missing_fields() {
        let settings = AiSettings::from_json_str(r#"{ "platform": "neuchar" }"#)
            .expect("settings should parse");

        assert_eq!(settings.platform, PlatformSelector::NeuCharOpenAi);
        assert!(settings.api_key.is_none());
        assert_eq!(settings.request_timeout(), Duration::from_secs(90));
    }

    #[test]
    fn settings_from_json_rejects_unknown_platform() {
        let error = AiSettings::from_json_str(r#"{ "platform": "bard" }"#)
            .expect_err("unknown platform should fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn settings_from_lookup_reads_prefixed_variables() {
        let vars = HashMap::from([
            ("KESTREL_AI_PLATFORM", "azure-openai"),
            ("KESTREL_API_KEY", "azure-key"),
            ("KESTREL_AZURE_ENDPOINT", "https://contoso.openai.azure.com"),
            ("KESTREL_AZURE_API_VERSION", "2024-02-01"),
            ("KESTREL_REQUEST_TIMEOUT_SECS", "30"),
            ("KESTREL_ORGANIZATION_ID", "   "),
        ]);

        let settings =
            AiSettings::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
                .expect("settings should load");

        assert_eq!(settings.platform, PlatformSelector::AzureOpenAi);
        assert_eq!(settings.api_key().map(|key| key.expose()), Some("azure-key"));
        assert_eq!(settings.azure_api_version.as_deref(), Some("2024-02-01"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.organization_id.is_none());
    }

    #[test]
    fn settings_from_lookup_rejects_bad_timeout() {
        let error = AiSettings::from_lookup(|name| {
            (name == "KESTREL_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .expect_err("bad timeout should fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let settings = AiSettings::new(PlatformSelector::OpenAi).with_api_key("   ");
        assert!(settings.api_key().is_none());
    }
}
