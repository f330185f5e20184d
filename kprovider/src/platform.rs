//! Backend family selectors and session purposes.
//!
//! ```rust
//! use kprovider::{PlatformSelector, Purpose};
//!
//! assert_eq!(PlatformSelector::parse("azure"), Some(PlatformSelector::AzureOpenAi));
//! assert_eq!(PlatformSelector::HuggingFace.to_string(), "huggingface");
//! assert_eq!(Purpose::Embedding.to_string(), "embedding");
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Deserialize;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum PlatformSelector {
    #[default]
    OpenAi,
    AzureOpenAi,
    NeuCharOpenAi,
    HuggingFace,
    Ollama,
}

impl PlatformSelector {
    pub const ALL: [PlatformSelector; 5] = [
        Self::OpenAi,
        Self::AzureOpenAi,
        Self::NeuCharOpenAi,
        Self::HuggingFace,
        Self::Ollama,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" | "open_ai" => Some(Self::OpenAi),
            "azure" | "azureopenai" | "azure-openai" | "azure_openai" => Some(Self::AzureOpenAi),
            "neuchar" | "neucharopenai" | "neuchar-openai" | "neuchar_openai" => {
                Some(Self::NeuCharOpenAi)
            }
            "huggingface" | "hugging-face" | "hugging_face" | "hf" => Some(Self::HuggingFace),
            "ollama" | "local" => Some(Self::Ollama),
            _ => None,
        }
    }
}

impl Display for PlatformSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure-openai",
            Self::NeuCharOpenAi => "neuchar-openai",
            Self::HuggingFace => "huggingface",
            Self::Ollama => "ollama",
        };

        f.write_str(id)
    }
}

impl FromStr for PlatformSelector {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            ProviderError::invalid_request(format!("unknown AI platform '{value}'"))
        })
    }
}

impl TryFrom<String> for PlatformSelector {
    type Error = ProviderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What a session's backend connection is configured to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Purpose {
    #[default]
    Completion,
    Embedding,
    Image,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Self::Completion, Self::Embedding, Self::Image];
}

impl Display for Purpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Completion => "completion",
            Self::Embedding => "embedding",
            Self::Image => "image",
        };

        f.write_str(id)
    }
}

/// How requests are addressed and authenticated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireStyle {
    /// `{base}/chat/completions` with a bearer token.
    Bearer,
    /// `{endpoint}/openai/deployments/{model}/...?api-version=` with an `api-key` header.
    Deployment,
}

#[cfg(test)]
mod tests {
    use super::{PlatformSelector, Purpose};

    #[test]
    fn platform_display_is_stable() {
        assert_eq!(PlatformSelector::OpenAi.to_string(), "openai");
        assert_eq!(PlatformSelector::AzureOpenAi.to_string(), "azure-openai");
        assert_eq!(PlatformSelector::NeuCharOpenAi.to_string(), "neuchar-openai");
        assert_eq!(PlatformSelector::HuggingFace.to_string(), "huggingface");
        assert_eq!(PlatformSelector::Ollama.to_string(), "ollama");
    }

    #[test]
    fn platform_parse_accepts_aliases_and_display_form() {
        for platform in PlatformSelector::ALL {
            assert_eq!(PlatformSelector::parse(&platform.to_string()), Some(platform));
        }

        assert_eq!(PlatformSelector::parse(" Azure "), Some(PlatformSelector::AzureOpenAi));
        assert_eq!(PlatformSelector::parse("HF"), Some(PlatformSelector::HuggingFace));
        assert_eq!(PlatformSelector::parse("local"), Some(PlatformSelector::Ollama));
        assert_eq!(PlatformSelector::parse("bard"), None);
    }

    #[test]
    fn platform_from_str_reports_unknown_values() {
        let error = "bard"
            .parse::<PlatformSelector>()
            .expect_err("unknown platform should fail");
        assert!(error.message.contains("bard"));
    }

    #[test]
    fn purpose_defaults_to_completion() {
        assert_eq!(Purpose::default(), Purpose::Completion);
        assert_eq!(Purpose::Image.to_string(), "image");
    }
}
