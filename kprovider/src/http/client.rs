//! reqwest-based client speaking the OpenAI-compatible REST surface.

use std::sync::Arc;

use kcommon::GenerationOptions;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    ClientConfig, ClientFactory, ImageOptions, ImageRef, PlatformSelector, ProviderClient,
    ProviderError, ProviderFuture, WireStyle,
};

use super::serde_api::{
    ChatApiResponse, EmbeddingApiRequest, EmbeddingApiResponse, ImageApiResponse,
    build_chat_request, build_image_request, extract_error_message,
};

pub(crate) const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
pub(crate) const EMBEDDINGS_PATH: &str = "embeddings";
pub(crate) const IMAGE_GENERATIONS_PATH: &str = "images/generations";

/// Builds [`HttpProviderClient`]s that share one connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory {
    client: Client,
}

impl HttpClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, config: &ClientConfig) -> Result<Arc<dyn ProviderClient>, ProviderError> {
        if config.endpoint.trim().is_empty() {
            return Err(ProviderError::invalid_request(format!(
                "{} client requires an endpoint",
                config.platform
            )));
        }

        Ok(Arc::new(HttpProviderClient::new(
            self.client.clone(),
            config.clone(),
        )))
    }
}

#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    client: Client,
    config: ClientConfig,
}

impl HttpProviderClient {
    pub fn new(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn apply_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        let Some(api_key) = self.config.api_key.as_ref() else {
            return builder;
        };

        match self.config.wire_style {
            WireStyle::Bearer => {
                let builder = builder.bearer_auth(api_key.expose());
                match self.config.organization_id.as_deref() {
                    Some(organization) => builder.header("OpenAI-Organization", organization),
                    None => builder,
                }
            }
            WireStyle::Deployment => builder.header("api-key", api_key.expose()),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = endpoint_url(&self.config, path);
        let builder = self
            .client
            .post(url)
            .timeout(self.config.timeout)
            .json(body);
        let response = self.apply_auth(builder).send().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|err| ProviderError::transport(err.to_string()))
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error_for_status(status, &body)
    }
}

impl ProviderClient for HttpProviderClient {
    fn platform(&self) -> PlatformSelector {
        self.config.platform
    }

    fn complete<'a>(
        &'a self,
        prompt: String,
        options: GenerationOptions,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let request = build_chat_request(&self.config.model, prompt, options)?;
            let response: ChatApiResponse =
                self.post_json(CHAT_COMPLETIONS_PATH, &request).await?;
            response.into_text()
        })
    }

    fn embed<'a>(&'a self, text: String) -> ProviderFuture<'a, Result<Vec<f32>, ProviderError>> {
        Box::pin(async move {
            let request = EmbeddingApiRequest {
                model: self.config.model.clone(),
                input: text,
            };
            let response: EmbeddingApiResponse = self.post_json(EMBEDDINGS_PATH, &request).await?;
            response.into_vector()
        })
    }

    fn generate_image<'a>(
        &'a self,
        prompt: String,
        options: ImageOptions,
    ) -> ProviderFuture<'a, Result<ImageRef, ProviderError>> {
        Box::pin(async move {
            let request = build_image_request(&self.config.model, prompt, options);
            let response: ImageApiResponse =
                self.post_json(IMAGE_GENERATIONS_PATH, &request).await?;
            response.into_image_ref()
        })
    }
}

/// Resolves the request URL for `path` under the config's wire style.
pub(crate) fn endpoint_url(config: &ClientConfig, path: &str) -> String {
    let base = config.endpoint.trim_end_matches('/');
    match config.wire_style {
        WireStyle::Bearer => format!("{base}/{path}"),
        WireStyle::Deployment => {
            let url = format!("{base}/openai/deployments/{}/{path}", config.model);
            match config.api_version.as_deref() {
                Some(version) => format!("{url}?api-version={version}"),
                None => url,
            }
        }
    }
}

pub(crate) fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("provider request failed with status {status}"));

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    };
    error.with_status(status.as_u16())
}
