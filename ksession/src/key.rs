//! Session cache keys.
//!
//! ```rust
//! use kprovider::{PlatformSelector, Purpose};
//! use ksession::SessionKey;
//!
//! let key = SessionKey::new(PlatformSelector::OpenAi, "jeffrey", "gpt-4o-mini", Purpose::Completion);
//! assert_eq!(key.service_id(), "jeffrey-gpt-4o-mini");
//! assert_eq!(key.to_string(), "openai/jeffrey-gpt-4o-mini/completion");
//! ```

use std::fmt::{Display, Formatter};

use kcommon::UserId;
use kprovider::{PlatformSelector, Purpose};

/// Identifies one cached session. Two keys are equal only when platform, user, model and
/// purpose all match, so the same model on two platforms never shares a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub platform: PlatformSelector,
    pub user_id: UserId,
    pub model: String,
    pub purpose: Purpose,
}

impl SessionKey {
    pub fn new(
        platform: PlatformSelector,
        user_id: impl Into<UserId>,
        model: impl Into<String>,
        purpose: Purpose,
    ) -> Self {
        Self {
            platform,
            user_id: user_id.into(),
            model: model.into(),
            purpose,
        }
    }

    /// The `{user}-{model}` identifier backends see for this session.
    pub fn service_id(&self) -> String {
        format!("{}-{}", self.user_id, self.model)
    }
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}-{}/{}",
            self.platform, self.user_id, self.model, self.purpose
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use kprovider::{PlatformSelector, Purpose};

    use super::SessionKey;

    #[test]
    fn keys_differ_by_purpose_and_platform() {
        let completion =
            SessionKey::new(PlatformSelector::OpenAi, "u1", "gpt-4o", Purpose::Completion);
        let embedding =
            SessionKey::new(PlatformSelector::OpenAi, "u1", "gpt-4o", Purpose::Embedding);
        let azure =
            SessionKey::new(PlatformSelector::AzureOpenAi, "u1", "gpt-4o", Purpose::Completion);

        let keys = HashSet::from([completion.clone(), embedding, azure, completion.clone()]);
        assert_eq!(keys.len(), 3);
        assert_eq!(completion.service_id(), "u1-gpt-4o");
    }
}
