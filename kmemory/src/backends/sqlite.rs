use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use kcommon::BoxFuture;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::MemoryError;
use crate::store::MemoryStore;
use crate::types::MemoryRecord;

const SELECT_COLUMNS: &str = "
    collection,
    id,
    text,
    is_reference,
    external_source_name,
    description,
    additional_metadata,
    embedding_json,
    saved_at_secs,
    saved_at_nanos
";

#[derive(Debug)]
pub struct SqliteMemoryStore {
    connection: Mutex<Connection>,
}

impl SqliteMemoryStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                MemoryError::storage(format!(
                    "failed to create sqlite parent directory: {error}"
                ))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            MemoryError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, MemoryError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            MemoryError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, MemoryError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                MemoryError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, MemoryError> {
        self.connection
            .lock()
            .map_err(|_| MemoryError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), MemoryError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS memory_records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                text TEXT NOT NULL,
                is_reference INTEGER NOT NULL,
                external_source_name TEXT,
                description TEXT,
                additional_metadata TEXT,
                embedding_json TEXT NOT NULL,
                saved_at_secs INTEGER NOT NULL,
                saved_at_nanos INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            );
            ",
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }

    fn upsert_row(conn: &Connection, record: &MemoryRecord) -> Result<(), MemoryError> {
        let embedding_json = serde_json::to_string(&record.embedding).map_err(|error| {
            MemoryError::storage(format!("failed to encode embedding: {error}"))
        })?;
        let (secs, nanos) = record.saved_at_parts();

        conn.execute(
            "
            INSERT INTO memory_records (
                collection,
                id,
                text,
                is_reference,
                external_source_name,
                description,
                additional_metadata,
                embedding_json,
                saved_at_secs,
                saved_at_nanos
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(collection, id) DO UPDATE SET
                text = excluded.text,
                is_reference = excluded.is_reference,
                external_source_name = excluded.external_source_name,
                description = excluded.description,
                additional_metadata = excluded.additional_metadata,
                embedding_json = excluded.embedding_json,
                saved_at_secs = excluded.saved_at_secs,
                saved_at_nanos = excluded.saved_at_nanos
            ",
            params![
                &record.collection,
                &record.id,
                &record.text,
                record.is_reference,
                record.external_source_name.as_deref(),
                record.description.as_deref(),
                record.additional_metadata.as_deref(),
                embedding_json,
                secs,
                nanos,
            ],
        )
        .map_err(|error| MemoryError::storage(format!("failed to upsert memory record: {error}")))?;

        Ok(())
    }
}

struct RawRecord {
    collection: String,
    id: String,
    text: String,
    is_reference: bool,
    external_source_name: Option<String>,
    description: Option<String>,
    additional_metadata: Option<String>,
    embedding_json: String,
    saved_at_secs: i64,
    saved_at_nanos: i64,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            collection: row.get(0)?,
            id: row.get(1)?,
            text: row.get(2)?,
            is_reference: row.get(3)?,
            external_source_name: row.get(4)?,
            description: row.get(5)?,
            additional_metadata: row.get(6)?,
            embedding_json: row.get(7)?,
            saved_at_secs: row.get(8)?,
            saved_at_nanos: row.get(9)?,
        })
    }

    fn into_record(self) -> Result<MemoryRecord, MemoryError> {
        let embedding: Vec<f32> = serde_json::from_str(&self.embedding_json).map_err(|error| {
            MemoryError::storage(format!(
                "failed to decode embedding for {}/{}: {error}",
                self.collection, self.id
            ))
        })?;

        Ok(MemoryRecord {
            collection: self.collection,
            id: self.id,
            text: self.text,
            is_reference: self.is_reference,
            external_source_name: self.external_source_name,
            description: self.description,
            additional_metadata: self.additional_metadata,
            embedding,
            saved_at: decode_system_time(self.saved_at_secs, self.saved_at_nanos),
        })
    }
}

impl MemoryStore for SqliteMemoryStore {
    fn upsert<'a>(&'a self, record: MemoryRecord) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            if record.collection.trim().is_empty() || record.id.trim().is_empty() {
                return Err(MemoryError::invalid_request(
                    "memory records need a collection and an id",
                ));
            }

            let conn = self.connection()?;
            Self::upsert_row(&conn, &record)
        })
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MemoryRecord>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let raw = conn
                .query_row(
                    &format!(
                        "SELECT {SELECT_COLUMNS} FROM memory_records WHERE collection = ?1 AND id = ?2"
                    ),
                    params![collection, id],
                    RawRecord::from_row,
                )
                .optional()
                .map_err(|error| {
                    MemoryError::storage(format!("failed to load memory record: {error}"))
                })?;

            raw.map(RawRecord::into_record).transpose()
        })
    }

    fn list<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MemoryRecord>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut statement = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM memory_records WHERE collection = ?1 ORDER BY id ASC"
                ))
                .map_err(|error| {
                    MemoryError::storage(format!("failed to prepare memory query: {error}"))
                })?;

            let rows = statement
                .query_map(params![collection], RawRecord::from_row)
                .map_err(|error| {
                    MemoryError::storage(format!("failed to query memory records: {error}"))
                })?;

            let mut records = Vec::new();
            for row in rows {
                let raw = row.map_err(|error| {
                    MemoryError::storage(format!("failed to decode memory row: {error}"))
                })?;
                records.push(raw.into_record()?);
            }

            Ok(records)
        })
    }

    fn remove<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let removed = conn
                .execute(
                    "DELETE FROM memory_records WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to remove memory record: {error}"))
                })?;

            Ok(removed > 0)
        })
    }

    fn collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut statement = conn
                .prepare("SELECT DISTINCT collection FROM memory_records ORDER BY collection ASC")
                .map_err(|error| {
                    MemoryError::storage(format!("failed to prepare collection query: {error}"))
                })?;

            let rows = statement
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|error| {
                    MemoryError::storage(format!("failed to query collections: {error}"))
                })?;

            let mut collections = Vec::new();
            for row in rows {
                collections.push(row.map_err(|error| {
                    MemoryError::storage(format!("failed to decode collection row: {error}"))
                })?);
            }

            Ok(collections)
        })
    }
}

fn decode_system_time(secs: i64, nanos: i64) -> SystemTime {
    let secs = u64::try_from(secs).unwrap_or_default();
    let nanos = u32::try_from(nanos).unwrap_or_default();
    UNIX_EPOCH + Duration::new(secs, nanos)
}

pub(crate) fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("KMEMORY_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".kestrel").join("kmemory.sqlite3");
    }

    PathBuf::from("kmemory.sqlite3")
}
