//! Strategy table mapping a platform and purpose onto a client configuration.
//!
//! Adding a platform is a table registration, not a new branch:
//!
//! ```rust
//! use kprovider::{AiSettings, ClientConfig, PlatformSelector, Purpose, WireStyle};
//! use ksession::{PlatformTable, SessionError, SessionKey};
//!
//! fn local_gateway(settings: &AiSettings, key: &SessionKey) -> Result<ClientConfig, SessionError> {
//!     Ok(ClientConfig::new(
//!         key.platform,
//!         key.purpose,
//!         key.model.clone(),
//!         "http://gateway.local/v1",
//!         WireStyle::Bearer,
//!     )
//!     .with_timeout(settings.request_timeout()))
//! }
//!
//! let mut table = PlatformTable::new();
//! table.register(PlatformSelector::Ollama, Purpose::Completion, local_gateway);
//!
//! let key = SessionKey::new(PlatformSelector::Ollama, "u1", "llama3", Purpose::Completion);
//! let config = table.configure(&AiSettings::default(), &key).expect("configured");
//! assert_eq!(config.endpoint, "http://gateway.local/v1");
//! assert!(!table.supports(PlatformSelector::Ollama, Purpose::Image));
//! ```

use kcommon::Registry;
use kprovider::{AiSettings, ClientConfig, PlatformSelector, Purpose, SecretString, WireStyle};

use crate::{SessionError, SessionKey};

pub const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1";

pub type Configurator = fn(&AiSettings, &SessionKey) -> Result<ClientConfig, SessionError>;

#[derive(Debug, Clone, Default)]
pub struct PlatformTable {
    branches: Registry<(PlatformSelector, Purpose), Configurator>,
}

impl PlatformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a branch for every platform this crate knows how to reach.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register_all(PlatformSelector::OpenAi, &Purpose::ALL, configure_openai);
        table.register_all(PlatformSelector::AzureOpenAi, &Purpose::ALL, configure_azure);
        table.register_all(
            PlatformSelector::NeuCharOpenAi,
            &Purpose::ALL,
            configure_neuchar,
        );
        table.register_all(
            PlatformSelector::HuggingFace,
            &[Purpose::Completion, Purpose::Embedding],
            configure_huggingface,
        );
        table.register_all(
            PlatformSelector::Ollama,
            &[Purpose::Completion, Purpose::Embedding],
            configure_ollama,
        );
        table
    }

    pub fn register(
        &mut self,
        platform: PlatformSelector,
        purpose: Purpose,
        configurator: Configurator,
    ) -> Option<Configurator> {
        self.branches.insert((platform, purpose), configurator)
    }

    pub fn register_all(
        &mut self,
        platform: PlatformSelector,
        purposes: &[Purpose],
        configurator: Configurator,
    ) {
        for purpose in purposes {
            self.register(platform, *purpose, configurator);
        }
    }

    pub fn unregister(&mut self, platform: PlatformSelector, purpose: Purpose) -> Option<Configurator> {
        self.branches.remove(&(platform, purpose))
    }

    pub fn supports(&self, platform: PlatformSelector, purpose: Purpose) -> bool {
        self.branches.contains_key(&(platform, purpose))
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Runs the branch registered for the key's platform and purpose.
    pub fn configure(
        &self,
        settings: &AiSettings,
        key: &SessionKey,
    ) -> Result<ClientConfig, SessionError> {
        let configurator = self
            .branches
            .get(&(key.platform, key.purpose))
            .ok_or_else(|| {
                SessionError::unsupported_platform(format!(
                    "no {} branch registered for platform '{}'",
                    key.purpose, key.platform
                ))
            })?;

        configurator(settings, key)
    }
}

pub fn configure_openai(
    settings: &AiSettings,
    key: &SessionKey,
) -> Result<ClientConfig, SessionError> {
    let api_key = required_api_key(settings, key)?;
    Ok(base_config(key, OPENAI_DEFAULT_ENDPOINT, WireStyle::Bearer, settings)
        .with_api_key(api_key)
        .with_organization_id(settings.organization_id.clone()))
}

pub fn configure_azure(
    settings: &AiSettings,
    key: &SessionKey,
) -> Result<ClientConfig, SessionError> {
    let api_key = required_api_key(settings, key)?;
    let endpoint = required(settings.azure_endpoint.as_deref(), key, "azure_endpoint")?;
    let api_version = required(settings.azure_api_version.as_deref(), key, "azure_api_version")?;

    Ok(base_config(key, endpoint, WireStyle::Deployment, settings)
        .with_api_key(api_key)
        .with_api_version(api_version))
}

/// The gateway speaks the managed-cloud wire format; its own API version wins over Azure's.
pub fn configure_neuchar(
    settings: &AiSettings,
    key: &SessionKey,
) -> Result<ClientConfig, SessionError> {
    let api_key = required_api_key(settings, key)?;
    let endpoint = required(settings.neuchar_endpoint.as_deref(), key, "neuchar_endpoint")?;
    let api_version = required(
        settings
            .neuchar_api_version
            .as_deref()
            .or(settings.azure_api_version.as_deref()),
        key,
        "neuchar_api_version",
    )?;

    Ok(base_config(key, endpoint, WireStyle::Deployment, settings)
        .with_api_key(api_key)
        .with_api_version(api_version))
}

pub fn configure_huggingface(
    settings: &AiSettings,
    key: &SessionKey,
) -> Result<ClientConfig, SessionError> {
    let endpoint = required(
        settings.huggingface_endpoint.as_deref(),
        key,
        "huggingface_endpoint",
    )?;

    let config = base_config(key, endpoint, WireStyle::Bearer, settings);
    Ok(match settings.api_key() {
        Some(api_key) => config.with_api_key(api_key.clone()),
        None => config,
    })
}

pub fn configure_ollama(
    settings: &AiSettings,
    key: &SessionKey,
) -> Result<ClientConfig, SessionError> {
    let endpoint = settings
        .ollama_endpoint
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(OLLAMA_DEFAULT_ENDPOINT);

    Ok(base_config(key, endpoint, WireStyle::Bearer, settings))
}

fn base_config(
    key: &SessionKey,
    endpoint: &str,
    wire_style: WireStyle,
    settings: &AiSettings,
) -> ClientConfig {
    ClientConfig::new(
        key.platform,
        key.purpose,
        key.model.clone(),
        endpoint.trim(),
        wire_style,
    )
    .with_timeout(settings.request_timeout())
}

fn required_api_key(settings: &AiSettings, key: &SessionKey) -> Result<SecretString, SessionError> {
    settings.api_key().cloned().ok_or_else(|| {
        SessionError::invalid_configuration(format!(
            "platform '{}' requires an api_key",
            key.platform
        ))
    })
}

fn required<'a>(
    value: Option<&'a str>,
    key: &SessionKey,
    field: &str,
) -> Result<&'a str, SessionError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            SessionError::invalid_configuration(format!(
                "platform '{}' requires {field}",
                key.platform
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kprovider::{AiSettings, PlatformSelector, Purpose, WireStyle};

    use super::{OLLAMA_DEFAULT_ENDPOINT, OPENAI_DEFAULT_ENDPOINT, PlatformTable};
    use crate::{SessionErrorKind, SessionKey};

    fn key(platform: PlatformSelector, purpose: Purpose) -> SessionKey {
        SessionKey::new(platform, "user-1", "model-a", purpose)
    }

    #[test]
    fn standard_table_covers_expected_branches() {
        let table = PlatformTable::standard();

        for purpose in Purpose::ALL {
            assert!(table.supports(PlatformSelector::OpenAi, purpose));
            assert!(table.supports(PlatformSelector::AzureOpenAi, purpose));
            assert!(table.supports(PlatformSelector::NeuCharOpenAi, purpose));
        }

        assert!(table.supports(PlatformSelector::HuggingFace, Purpose::Embedding));
        assert!(!table.supports(PlatformSelector::HuggingFace, Purpose::Image));
        assert!(!table.supports(PlatformSelector::Ollama, Purpose::Image));
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn openai_branch_uses_default_endpoint_and_organization() {
        let settings = AiSettings::new(PlatformSelector::OpenAi)
            .with_api_key("sk-1")
            .with_organization_id("org-9")
            .with_request_timeout(Duration::from_secs(12));

        let config = PlatformTable::standard()
            .configure(&settings, &key(PlatformSelector::OpenAi, Purpose::Completion))
            .expect("openai config");

        assert_eq!(config.endpoint, OPENAI_DEFAULT_ENDPOINT);
        assert_eq!(config.wire_style, WireStyle::Bearer);
        assert_eq!(config.organization_id.as_deref(), Some("org-9"));
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.model, "model-a");
    }

    #[test]
    fn openai_branch_requires_api_key() {
        let error = PlatformTable::standard()
            .configure(
                &AiSettings::new(PlatformSelector::OpenAi),
                &key(PlatformSelector::OpenAi, Purpose::Completion),
            )
            .expect_err("missing key must fail");
        assert_eq!(error.kind, SessionErrorKind::InvalidConfiguration);
    }

    #[test]
    fn azure_branch_requires_endpoint_and_version() {
        let table = PlatformTable::standard();
        let azure_key = key(PlatformSelector::AzureOpenAi, Purpose::Embedding);

        let missing = AiSettings::new(PlatformSelector::AzureOpenAi).with_api_key("k");
        let error = table
            .configure(&missing, &azure_key)
            .expect_err("missing endpoint must fail");
        assert!(error.message.contains("azure_endpoint"));

        let complete = missing.with_azure("https://contoso.openai.azure.com", "2024-02-01");
        let config = table.configure(&complete, &azure_key).expect("azure config");
        assert_eq!(config.wire_style, WireStyle::Deployment);
        assert_eq!(config.api_version.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn neuchar_branch_falls_back_to_azure_api_version() {
        let mut settings = AiSettings::new(PlatformSelector::NeuCharOpenAi).with_api_key("k");
        settings.neuchar_endpoint = Some("https://www.neuchar.com/".to_string());
        settings.azure_api_version = Some("2022-12-01".to_string());

        let config = PlatformTable::standard()
            .configure(&settings, &key(PlatformSelector::NeuCharOpenAi, Purpose::Completion))
            .expect("neuchar config");

        assert_eq!(config.api_version.as_deref(), Some("2022-12-01"));
        assert_eq!(config.endpoint, "https://www.neuchar.com/");
    }

    #[test]
    fn huggingface_image_generation_is_unsupported() {
        let settings = AiSettings::new(PlatformSelector::HuggingFace)
            .with_huggingface_endpoint("https://router.huggingface.co/v1");
        let error = PlatformTable::standard()
            .configure(&settings, &key(PlatformSelector::HuggingFace, Purpose::Image))
            .expect_err("image on huggingface must fail");
        assert_eq!(error.kind, SessionErrorKind::UnsupportedPlatform);
    }

    #[test]
    fn huggingface_key_is_optional() {
        let settings = AiSettings::new(PlatformSelector::HuggingFace)
            .with_huggingface_endpoint("https://router.huggingface.co/v1");
        let config = PlatformTable::standard()
            .configure(&settings, &key(PlatformSelector::HuggingFace, Purpose::Completion))
            .expect("huggingface config");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn ollama_defaults_to_local_endpoint() {
        let config = PlatformTable::standard()
            .configure(
                &AiSettings::new(PlatformSelector::Ollama),
                &key(PlatformSelector::Ollama, Purpose::Completion),
            )
            .expect("ollama config");
        assert_eq!(config.endpoint, OLLAMA_DEFAULT_ENDPOINT);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn empty_table_reports_unsupported_platform() {
        let error = PlatformTable::new()
            .configure(
                &AiSettings::default(),
                &key(PlatformSelector::OpenAi, Purpose::Completion),
            )
            .expect_err("empty table must fail");
        assert_eq!(error.kind, SessionErrorKind::UnsupportedPlatform);
    }
}
