//! Ad hoc per-session settings.

use std::collections::HashMap;

use serde_json::Value;

/// Key holding the optional chat history cap for a session.
pub const MAX_HISTORY_COUNT_KEY: &str = "MaxHistoryCount";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TempStore {
    values: HashMap<String, Value>,
}

impl TempStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Reads a non-negative integer; numeric strings are accepted.
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        match self.get(key)? {
            Value::Number(number) => number.as_u64().and_then(|value| usize::try_from(value).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_HISTORY_COUNT_KEY, TempStore};

    #[test]
    fn history_cap_reads_numbers_and_numeric_strings() {
        let mut store = TempStore::new();
        assert_eq!(store.get_usize(MAX_HISTORY_COUNT_KEY), None);

        store.set(MAX_HISTORY_COUNT_KEY, 5_u64);
        assert_eq!(store.get_usize(MAX_HISTORY_COUNT_KEY), Some(5));

        store.set(MAX_HISTORY_COUNT_KEY, " 3 ");
        assert_eq!(store.get_usize(MAX_HISTORY_COUNT_KEY), Some(3));

        store.set(MAX_HISTORY_COUNT_KEY, -1_i64);
        assert_eq!(store.get_usize(MAX_HISTORY_COUNT_KEY), None);
    }

    #[test]
    fn remove_and_clear_drop_values() {
        let mut store = TempStore::new();
        store.set("mode", "fast");
        store.set("limit", 2_u64);

        assert_eq!(store.get_str("mode"), Some("fast"));
        assert!(store.remove("mode").is_some());
        assert!(!store.contains_key("mode"));

        store.clear();
        assert!(store.is_empty());
    }
}
