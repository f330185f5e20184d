//! Records kept by memory stores and search results.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub collection: String,
    pub id: String,
    /// Empty for references; the source system owns the text.
    pub text: String,
    pub is_reference: bool,
    pub external_source_name: Option<String>,
    pub description: Option<String>,
    pub additional_metadata: Option<String>,
    pub embedding: Vec<f32>,
    pub saved_at: SystemTime,
}

impl MemoryRecord {
    /// A record that keeps its own copy of `text`.
    pub fn information(
        collection: impl Into<String>,
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            text: text.into(),
            is_reference: false,
            external_source_name: None,
            description: None,
            additional_metadata: None,
            embedding: Vec::new(),
            saved_at: SystemTime::now(),
        }
    }

    /// A record pointing at `external_id` in `external_source_name`.
    pub fn reference(
        collection: impl Into<String>,
        external_id: impl Into<String>,
        external_source_name: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: external_id.into(),
            text: String::new(),
            is_reference: true,
            external_source_name: Some(external_source_name.into()),
            description: None,
            additional_metadata: None,
            embedding: Vec::new(),
            saved_at: SystemTime::now(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_additional_metadata(mut self, metadata: Option<String>) -> Self {
        self.additional_metadata = metadata;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn with_saved_at(mut self, saved_at: SystemTime) -> Self {
        self.saved_at = saved_at;
        self
    }

    pub(crate) fn saved_at_parts(&self) -> (i64, i64) {
        let duration = self
            .saved_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        (duration.as_secs() as i64, i64::from(duration.subsec_nanos()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryQueryResult {
    pub record: MemoryRecord,
    /// Cosine similarity between the query and the record, in `[-1, 1]`.
    pub relevance: f32,
}
