//! The durable memory store boundary and its volatile implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use kcommon::BoxFuture;

use crate::backends::sqlite::{SqliteMemoryStore, default_sqlite_path};
use crate::error::MemoryError;
use crate::types::MemoryRecord;

pub trait MemoryStore: Send + Sync {
    /// Inserts or replaces the record stored under `(record.collection, record.id)`.
    fn upsert<'a>(&'a self, record: MemoryRecord) -> BoxFuture<'a, Result<(), MemoryError>>;

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MemoryRecord>, MemoryError>>;

    /// All records of a collection ordered by id; unknown collections are empty.
    fn list<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MemoryRecord>, MemoryError>>;

    /// Returns whether a record was removed.
    fn remove<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<bool, MemoryError>>;

    fn collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, MemoryError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryStoreConfig {
    Sqlite { path: PathBuf },
    InMemory,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_memory_store(config: MemoryStoreConfig) -> Result<Arc<dyn MemoryStore>, MemoryError> {
    match config {
        MemoryStoreConfig::Sqlite { path } => Ok(Arc::new(SqliteMemoryStore::new(path)?)),
        MemoryStoreConfig::InMemory => Ok(Arc::new(InMemoryMemoryStore::new())),
    }
}

pub fn create_default_memory_store() -> Result<Arc<dyn MemoryStore>, MemoryError> {
    create_memory_store(MemoryStoreConfig::default())
}

#[derive(Debug, Default)]
pub struct InMemoryMemoryStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, MemoryRecord>>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, BTreeMap<String, MemoryRecord>>>, MemoryError>
    {
        self.collections
            .lock()
            .map_err(|_| MemoryError::storage("memory store lock poisoned"))
    }
}

impl MemoryStore for InMemoryMemoryStore {
    fn upsert<'a>(&'a self, record: MemoryRecord) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            if record.collection.trim().is_empty() || record.id.trim().is_empty() {
                return Err(MemoryError::invalid_request(
                    "memory records need a collection and an id",
                ));
            }

            let mut collections = self.records()?;
            collections
                .entry(record.collection.clone())
                .or_default()
                .insert(record.id.clone(), record);
            Ok(())
        })
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MemoryRecord>, MemoryError>> {
        Box::pin(async move {
            let collections = self.records()?;
            Ok(collections
                .get(collection)
                .and_then(|records| records.get(id))
                .cloned())
        })
    }

    fn list<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MemoryRecord>, MemoryError>> {
        Box::pin(async move {
            let collections = self.records()?;
            Ok(collections
                .get(collection)
                .map(|records| records.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn remove<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async move {
            let mut collections = self.records()?;
            let Some(records) = collections.get_mut(collection) else {
                return Ok(false);
            };
            let removed = records.remove(id).is_some();
            if records.is_empty() {
                collections.remove(collection);
            }
            Ok(removed)
        })
    }

    fn collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, MemoryError>> {
        Box::pin(async move { Ok(self.records()?.keys().cloned().collect()) })
    }
}
