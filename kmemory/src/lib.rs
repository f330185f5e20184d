//! Semantic memory stores and the pending-operation batch that flushes background writes.

mod backends;
mod batch;
mod error;
mod queue;
mod semantic;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        BatchError, BatchHooks, BatchReport, CompletedOperation, InMemoryMemoryStore,
        MemoryError, MemoryErrorKind, MemoryQueryResult, MemoryRecord, MemoryStore,
        MemoryStoreConfig, MemoryWriteQueue, NoopBatchHooks, OperationFailure, OperationId,
        PendingOperationBatch, SaveInformation, SaveReference, SemanticMemory,
        SqliteMemoryStore, TextEmbedder, create_default_memory_store, create_memory_store,
    };
}

pub use backends::sqlite::SqliteMemoryStore;
pub use batch::{BatchHooks, BatchReport, CompletedOperation, NoopBatchHooks, PendingOperationBatch};
pub use error::{BatchError, MemoryError, MemoryErrorKind, OperationFailure, OperationId};
pub use queue::MemoryWriteQueue;
pub use semantic::{SaveInformation, SaveReference, SemanticMemory, TextEmbedder, cosine_similarity};
pub use store::{
    InMemoryMemoryStore, MemoryStore, MemoryStoreConfig, create_default_memory_store,
    create_memory_store,
};
pub use types::{MemoryQueryResult, MemoryRecord};
