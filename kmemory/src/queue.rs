//! Memory writes issued as pending operations instead of being awaited inline.

use std::sync::Arc;

use crate::batch::{BatchReport, PendingOperationBatch};
use crate::error::{BatchError, MemoryError, OperationId};
use crate::semantic::{SaveInformation, SaveReference, SemanticMemory};

#[derive(Debug, Clone)]
pub struct MemoryWriteQueue {
    memory: SemanticMemory,
    batch: Arc<PendingOperationBatch>,
}

impl MemoryWriteQueue {
    pub fn new(memory: SemanticMemory) -> Self {
        Self::with_batch(memory, Arc::new(PendingOperationBatch::new()))
    }

    /// Shares `batch` with other writers, so one join flushes all of them.
    pub fn with_batch(memory: SemanticMemory, batch: Arc<PendingOperationBatch>) -> Self {
        Self { memory, batch }
    }

    pub fn memory(&self) -> &SemanticMemory {
        &self.memory
    }

    pub fn batch(&self) -> &Arc<PendingOperationBatch> {
        &self.batch
    }

    pub fn save_reference(&self, request: SaveReference) -> Result<OperationId, MemoryError> {
        let label = format!("save_reference:{}/{}", request.collection, request.external_id);
        let memory = self.memory.clone();
        self.batch.enqueue(label, async move {
            memory.save_reference(request).await.map(|_| ())
        })
    }

    pub fn save_information(&self, request: SaveInformation) -> Result<OperationId, MemoryError> {
        let label = format!("save_information:{}/{}", request.collection, request.id);
        let memory = self.memory.clone();
        self.batch.enqueue(label, async move {
            memory.save_information(request).await.map(|_| ())
        })
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    pub async fn join(&self) -> Result<BatchReport, BatchError> {
        self.batch.join().await
    }
}
