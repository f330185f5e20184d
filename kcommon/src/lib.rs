//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use kcommon::{ConversationKey, GenerationOptions, MetadataMap, UserId};
//!
//! let user = UserId::from("jeffrey");
//! let conversation = ConversationKey::new("jeffrey/chat-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3).with_top_p(0.5);
//! assert_eq!(user.as_str(), "jeffrey");
//! assert_eq!(conversation.to_string(), "jeffrey/chat-1");
//! assert_eq!(options.top_p, Some(0.5));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use kcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use kcommon::{ConversationKey, UserId};
    //!
    //! let user = UserId::new("user-42");
    //! let conversation = ConversationKey::from("user-42/support");
    //!
    //! assert_eq!(user.to_string(), "user-42");
    //! assert_eq!(conversation.as_str(), "user-42/support");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    /// Caller identity used to scope sessions and guard against API abuse.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct UserId(String);

    impl UserId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for UserId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for UserId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for UserId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    /// Identifies one running conversation and its stored arguments.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ConversationKey(String);

    impl ConversationKey {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for ConversationKey {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for ConversationKey {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for ConversationKey {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Shared generation settings used by completion requests and prompt functions.
    //!
    //! ```rust
    //! use kcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128)
    //!     .with_stop_sequence("Human:");
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! assert_eq!(options.stop_sequences, vec!["Human:".to_string()]);
    //! ```

    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub top_p: Option<f32>,
        pub presence_penalty: Option<f32>,
        pub frequency_penalty: Option<f32>,
        pub stop_sequences: Vec<String>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }

        pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
            self.presence_penalty = Some(penalty);
            self
        }

        pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
            self.frequency_penalty = Some(penalty);
            self
        }

        pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
            self.stop_sequences.push(stop.into());
            self
        }

        /// Fills every unset field from `defaults`; values already set win.
        pub fn merged_with(mut self, defaults: &GenerationOptions) -> Self {
            self.temperature = self.temperature.or(defaults.temperature);
            self.max_tokens = self.max_tokens.or(defaults.max_tokens);
            self.top_p = self.top_p.or(defaults.top_p);
            self.presence_penalty = self.presence_penalty.or(defaults.presence_penalty);
            self.frequency_penalty = self.frequency_penalty.or(defaults.frequency_penalty);
            if self.stop_sequences.is_empty() {
                self.stop_sequences = defaults.stop_sequences.clone();
            }
            self
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use kcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }

        pub fn clear(&mut self) {
            self.items.clear();
        }
    }
}

pub use context::{ConversationKey, MetadataMap, UserId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{ConversationKey, GenerationOptions, Registry, UserId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let user = UserId::new("user-1");
        let conversation = ConversationKey::from("user-1/chat");

        assert_eq!(user.as_str(), "user-1");
        assert_eq!(conversation.as_str(), "user-1/chat");
        assert_eq!(user.to_string(), "user-1");
        assert_eq!(conversation.to_string(), "user-1/chat");
    }

    #[test]
    fn generation_options_builder_helpers_set_values() {
        let options = GenerationOptions::default()
            .with_temperature(0.3)
            .with_max_tokens(123)
            .with_top_p(0.9)
            .with_presence_penalty(0.1)
            .with_frequency_penalty(0.2);

        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.max_tokens, Some(123));
        assert_eq!(options.top_p, Some(0.9));
        assert_eq!(options.presence_penalty, Some(0.1));
        assert_eq!(options.frequency_penalty, Some(0.2));
    }

    #[test]
    fn merged_options_keep_explicit_values_and_fill_gaps() {
        let defaults = GenerationOptions::default()
            .with_temperature(0.7)
            .with_max_tokens(256)
            .with_stop_sequence("Human:");
        let explicit = GenerationOptions::default().with_temperature(0.1);

        let merged = explicit.merged_with(&defaults);
        assert_eq!(merged.temperature, Some(0.1));
        assert_eq!(merged.max_tokens, Some(256));
        assert_eq!(merged.stop_sequences, vec!["Human:".to_string()]);
    }

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);

        let removed = registry.remove("alpha");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }
}
