//! Focused unit tests for HTTP client internals.

#![cfg(test)]

use kcommon::GenerationOptions;
use reqwest::StatusCode;

use crate::{
    ClientConfig, ClientFactory, ImageOptions, ImageRef, PlatformSelector, ProviderClient,
    ProviderErrorKind, Purpose, WireStyle,
};

use super::HttpClientFactory;
use super::client::{
    CHAT_COMPLETIONS_PATH, EMBEDDINGS_PATH, IMAGE_GENERATIONS_PATH, endpoint_url,
    error_for_status,
};
use super::serde_api::{
    ChatApiResponse, EmbeddingApiResponse, ImageApiResponse, build_chat_request,
    build_image_request, extract_error_message,
};

fn bearer_config() -> ClientConfig {
    ClientConfig::new(
        PlatformSelector::OpenAi,
        Purpose::Completion,
        "gpt-4o-mini",
        "https://api.openai.com/v1/",
        WireStyle::Bearer,
    )
}

fn deployment_config() -> ClientConfig {
    ClientConfig::new(
        PlatformSelector::AzureOpenAi,
        Purpose::Completion,
        "chat-deployment",
        "https://contoso.openai.azure.com",
        WireStyle::Deployment,
    )
    .with_api_version("2024-02-01")
}

#[test]
fn bearer_endpoint_appends_path_to_base() {
    let config = bearer_config();
    assert_eq!(
        endpoint_url(&config, CHAT_COMPLETIONS_PATH),
        "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(
        endpoint_url(&config, EMBEDDINGS_PATH),
        "https://api.openai.com/v1/embeddings"
    );
}

#[test]
fn deployment_endpoint_routes_through_model_deployment() {
    let config = deployment_config();
    assert_eq!(
        endpoint_url(&config, CHAT_COMPLETIONS_PATH),
        "https://contoso.openai.azure.com/openai/deployments/chat-deployment/chat/completions?api-version=2024-02-01"
    );
    assert_eq!(
        endpoint_url(&config, IMAGE_GENERATIONS_PATH),
        "https://contoso.openai.azure.com/openai/deployments/chat-deployment/images/generations?api-version=2024-02-01"
    );
}

#[test]
fn status_codes_map_to_provider_error_kinds() {
    let cases = [
        (StatusCode::UNAUTHORIZED, ProviderErrorKind::Authentication),
        (StatusCode::FORBIDDEN, ProviderErrorKind::Authentication),
        (StatusCode::TOO_MANY_REQUESTS, ProviderErrorKind::RateLimited),
        (StatusCode::REQUEST_TIMEOUT, ProviderErrorKind::Timeout),
        (StatusCode::GATEWAY_TIMEOUT, ProviderErrorKind::Timeout),
        (StatusCode::BAD_REQUEST, ProviderErrorKind::InvalidRequest),
        (StatusCode::UNPROCESSABLE_ENTITY, ProviderErrorKind::InvalidRequest),
        (StatusCode::SERVICE_UNAVAILABLE, ProviderErrorKind::Unavailable),
        (StatusCode::BAD_GATEWAY, ProviderErrorKind::Unavailable),
        (StatusCode::INTERNAL_SERVER_ERROR, ProviderErrorKind::Transport),
    ];

    for (status, kind) in cases {
        assert_eq!(error_for_status(status, "").kind, kind, "status {status}");
    }
}

#[test]
fn error_message_prefers_api_error_body() {
    let body = r#"{"error":{"message":"quota exceeded","type":"insufficient_quota"}}"#;
    assert_eq!(extract_error_message(body).as_deref(), Some("quota exceeded"));

    let error = error_for_status(StatusCode::TOO_MANY_REQUESTS, body);
    assert_eq!(error.message, "quota exceeded");
    assert_eq!(error.status, Some(429));
    assert!(error.retryable);

    let fallback = error_for_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
    assert!(fallback.message.contains("502"));
}

#[test]
fn chat_request_carries_generation_options() {
    let options = GenerationOptions::default()
        .with_temperature(0.5)
        .with_max_tokens(64)
        .with_stop_sequence("Human:");
    let request = build_chat_request("gpt-4o-mini", "hello".to_string(), options)
        .expect("request should build");
    let json = serde_json::to_value(&request).expect("request should serialize");

    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "hello");
    assert_eq!(json["max_tokens"], 64);
    assert_eq!(json["stop"][0], "Human:");
    assert!(json.get("top_p").is_none());
}

#[test]
fn chat_request_rejects_blank_prompt_and_zero_tokens() {
    let blank = build_chat_request("gpt", "   ".to_string(), GenerationOptions::default())
        .expect_err("blank prompt must fail");
    assert_eq!(blank.kind, ProviderErrorKind::InvalidRequest);

    let zero = build_chat_request(
        "gpt",
        "hi".to_string(),
        GenerationOptions::default().with_max_tokens(0),
    )
    .expect_err("zero max tokens must fail");
    assert_eq!(zero.kind, ProviderErrorKind::InvalidRequest);
}

#[test]
fn responses_convert_to_boundary_values() {
    let chat: ChatApiResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"4"}}]}"#)
            .expect("chat response should parse");
    assert_eq!(chat.into_text().expect("text"), "4");

    let empty: ChatApiResponse =
        serde_json::from_str(r#"{"choices":[]}"#).expect("empty response should parse");
    assert_eq!(
        empty.into_text().expect_err("no choices").kind,
        ProviderErrorKind::Other
    );

    let embedding: EmbeddingApiResponse =
        serde_json::from_str(r#"{"data":[{"embedding":[0.25,0.5]}]}"#)
            .expect("embedding response should parse");
    assert_eq!(embedding.into_vector().expect("vector"), vec![0.25, 0.5]);

    let image: ImageApiResponse = serde_json::from_str(r#"{"data":[{"b64_json":"aGVsbG8="}]}"#)
        .expect("image response should parse");
    assert_eq!(
        image.into_image_ref().expect("image"),
        ImageRef::Base64("aGVsbG8=".to_string())
    );
}

#[test]
fn image_request_uses_size_string() {
    let request = build_image_request("dall-e-3", "a kestrel".to_string(), ImageOptions::new(512, 512));
    assert_eq!(request.size, "512x512");
    assert_eq!(request.n, 1);
}

#[test]
fn factory_rejects_blank_endpoint() {
    let config = ClientConfig::new(
        PlatformSelector::HuggingFace,
        Purpose::Embedding,
        "bge-small",
        "  ",
        WireStyle::Bearer,
    );
    let error = HttpClientFactory::new()
        .build(&config)
        .expect_err("blank endpoint must fail");
    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
}

#[test]
fn factory_builds_client_for_configured_platform() {
    let client = HttpClientFactory::new()
        .build(&deployment_config())
        .expect("client should build");
    assert_eq!(client.platform(), PlatformSelector::AzureOpenAi);
}
