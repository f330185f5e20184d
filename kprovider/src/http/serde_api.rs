//! OpenAI-compatible HTTP payload serde models and conversion helpers.

use kcommon::GenerationOptions;
use serde::{Deserialize, Serialize};

use crate::{ImageOptions, ImageRef, ProviderError};

pub(crate) fn build_chat_request(
    model: &str,
    prompt: String,
    options: GenerationOptions,
) -> Result<ChatApiRequest, ProviderError> {
    if prompt.trim().is_empty() {
        return Err(ProviderError::invalid_request(
            "completion request requires a non-empty prompt",
        ));
    }

    if options.max_tokens == Some(0) {
        return Err(ProviderError::invalid_request(
            "max_tokens must be greater than zero",
        ));
    }

    Ok(ChatApiRequest {
        model: model.to_string(),
        messages: vec![ChatApiMessage {
            role: "user".to_string(),
            content: prompt,
        }],
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        top_p: options.top_p,
        presence_penalty: options.presence_penalty,
        frequency_penalty: options.frequency_penalty,
        stop: (!options.stop_sequences.is_empty()).then_some(options.stop_sequences),
    })
}

pub(crate) fn build_image_request(
    model: &str,
    prompt: String,
    options: ImageOptions,
) -> ImageApiRequest {
    ImageApiRequest {
        model: model.to_string(),
        prompt,
        n: 1,
        size: options.size(),
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatApiRequest {
    pub model: String,
    pub messages: Vec<ChatApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiResponse {
    #[serde(default)]
    pub choices: Vec<ChatApiChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiChoice {
    pub message: ChatApiResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatApiResponse {
    pub(crate) fn into_text(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::other("completion response contained no choices"))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingApiRequest {
    pub model: String,
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingApiResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingApiItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingApiItem {
    pub embedding: Vec<f32>,
}

impl EmbeddingApiResponse {
    pub(crate) fn into_vector(self) -> Result<Vec<f32>, ProviderError> {
        self.data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| ProviderError::other("embedding response contained no vectors"))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageApiRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageApiResponse {
    #[serde(default)]
    pub data: Vec<ImageApiItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageApiItem {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

impl ImageApiResponse {
    pub(crate) fn into_image_ref(self) -> Result<ImageRef, ProviderError> {
        let item = self
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::other("image response contained no images"))?;

        match (item.url, item.b64_json) {
            (Some(url), _) => Ok(ImageRef::Url(url)),
            (None, Some(payload)) => Ok(ImageRef::Base64(payload)),
            (None, None) => Err(ProviderError::other(
                "image response carried neither a url nor a base64 payload",
            )),
        }
    }
}
