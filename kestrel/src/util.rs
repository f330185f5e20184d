//! Small convenience constructors for common types.

use crate::{
    ChatTurnRequest, ConversationKey, PlatformSelector, Purpose, SaveInformation, SaveReference,
    SessionRequest, UserId,
};

pub fn session_request(
    platform: PlatformSelector,
    user_id: impl Into<UserId>,
    model: impl Into<String>,
) -> SessionRequest {
    SessionRequest::new(platform, user_id, model)
}

pub fn turn(conversation: impl Into<ConversationKey>, input: impl Into<String>) -> ChatTurnRequest {
    ChatTurnRequest::new(conversation, input)
}

pub fn information(
    collection: impl Into<String>,
    id: impl Into<String>,
    text: impl Into<String>,
) -> SaveInformation {
    SaveInformation::new(collection, text, id)
}

pub fn reference(
    collection: impl Into<String>,
    text: impl Into<String>,
    external_id: impl Into<String>,
    external_source_name: impl Into<String>,
) -> SaveReference {
    SaveReference::new(collection, text, external_id, external_source_name)
}

pub fn parse_platform(value: &str) -> Option<PlatformSelector> {
    PlatformSelector::parse(value)
}

pub fn parse_purpose(value: &str) -> Option<Purpose> {
    match value.trim().to_ascii_lowercase().as_str() {
        "completion" | "chat" | "text" => Some(Purpose::Completion),
        "embedding" | "embeddings" | "embed" => Some(Purpose::Embedding),
        "image" | "images" | "dall-e" | "dalle" => Some(Purpose::Image),
        _ => None,
    }
}
