//! Saving and searching text by meaning on top of a [`MemoryStore`].

use std::sync::Arc;

use kcommon::BoxFuture;
use ksession::{InvokeOptions, Session};

use crate::error::MemoryError;
use crate::store::MemoryStore;
use crate::types::{MemoryQueryResult, MemoryRecord};

/// Turns text into an embedding vector.
pub trait TextEmbedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, MemoryError>>;
}

impl TextEmbedder for Session {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, MemoryError>> {
        Box::pin(async move {
            Session::embed(self, text, InvokeOptions::default())
                .await
                .map_err(MemoryError::from)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReference {
    pub collection: String,
    pub text: String,
    pub external_id: String,
    pub external_source_name: String,
    pub description: Option<String>,
    pub additional_metadata: Option<String>,
}

impl SaveReference {
    pub fn new(
        collection: impl Into<String>,
        text: impl Into<String>,
        external_id: impl Into<String>,
        external_source_name: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            text: text.into(),
            external_id: external_id.into(),
            external_source_name: external_source_name.into(),
            description: None,
            additional_metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_additional_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.additional_metadata = Some(metadata.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInformation {
    pub collection: String,
    pub text: String,
    pub id: String,
    pub description: Option<String>,
    pub additional_metadata: Option<String>,
}

impl SaveInformation {
    pub fn new(
        collection: impl Into<String>,
        text: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            text: text.into(),
            id: id.into(),
            description: None,
            additional_metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_additional_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.additional_metadata = Some(metadata.into());
        self
    }
}

/// A memory store paired with an optional embedder.
///
/// Without an embedder records are saved with an empty embedding and [`SemanticMemory::search`]
/// fails with [`crate::MemoryErrorKind::Embedding`].
#[derive(Clone)]
pub struct SemanticMemory {
    store: Arc<dyn MemoryStore>,
    embedder: Option<Arc<dyn TextEmbedder>>,
}

impl SemanticMemory {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            embedder: None,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn TextEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Stores a pointer to text owned by another system. Returns the record id.
    pub async fn save_reference(&self, request: SaveReference) -> Result<String, MemoryError> {
        require("collection", &request.collection)?;
        require("external id", &request.external_id)?;

        let embedding = self.embedding_for(&request.text).await?;
        let record = MemoryRecord::reference(
            request.collection,
            request.external_id,
            request.external_source_name,
        )
        .with_description(request.description)
        .with_additional_metadata(request.additional_metadata)
        .with_embedding(embedding);

        let id = record.id.clone();
        self.store.upsert(record).await?;
        Ok(id)
    }

    /// Stores `text` itself under `id`. Returns the record id.
    pub async fn save_information(&self, request: SaveInformation) -> Result<String, MemoryError> {
        require("collection", &request.collection)?;
        require("id", &request.id)?;

        let embedding = self.embedding_for(&request.text).await?;
        let record = MemoryRecord::information(request.collection, request.id, request.text)
            .with_description(request.description)
            .with_additional_metadata(request.additional_metadata)
            .with_embedding(embedding);

        let id = record.id.clone();
        self.store.upsert(record).await?;
        Ok(id)
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<MemoryRecord>, MemoryError> {
        self.store.get(collection, id).await
    }

    pub async fn remove(&self, collection: &str, id: &str) -> Result<bool, MemoryError> {
        self.store.remove(collection, id).await
    }

    /// Up to `limit` records of `collection` whose cosine similarity to `query` is at least
    /// `min_relevance`, most relevant first.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance: f32,
    ) -> Result<Vec<MemoryQueryResult>, MemoryError> {
        let Some(embedder) = &self.embedder else {
            return Err(MemoryError::embedding(
                "semantic search needs an embedder",
            ));
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_vector = embedder.embed(query).await?;
        let mut results: Vec<MemoryQueryResult> = self
            .store
            .list(collection)
            .await?
            .into_iter()
            .filter_map(|record| {
                let relevance = cosine_similarity(&query_vector, &record.embedding)?;
                (relevance >= min_relevance).then_some(MemoryQueryResult { record, relevance })
            })
            .collect();

        results.sort_by(|left, right| right.relevance.total_cmp(&left.relevance));
        results.truncate(limit);
        Ok(results)
    }

    async fn embedding_for(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        match &self.embedder {
            Some(embedder) => embedder.embed(text).await,
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for SemanticMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticMemory")
            .field("has_embedder", &self.embedder.is_some())
            .finish_non_exhaustive()
    }
}

fn require(field: &str, value: &str) -> Result<(), MemoryError> {
    if value.trim().is_empty() {
        return Err(MemoryError::invalid_request(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// `None` when the vectors differ in length or either has zero magnitude.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Option<f32> {
    if left.is_empty() || left.len() != right.len() {
        return None;
    }

    let mut dot = 0.0f32;
    let mut left_norm = 0.0f32;
    let mut right_norm = 0.0f32;
    for (a, b) in left.iter().zip(right) {
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return None;
    }

    Some(dot / (left_norm.sqrt() * right_norm.sqrt()))
}
