use super::{document_key, Document, DocumentStore};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    docs: RwLock<HashMap<String, serde_json::Value>>,
    batches: RwLock<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches written so far.
    pub fn batch_count(&self) -> usize {
        *self.batches.read()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn write_batch(&self, docs: Vec<Document>) -> Result<()> {
        let mut stored = self.docs.write();
        for doc in docs {
            stored.insert(doc.key(), doc.body);
        }
        *self.batches.write() += 1;
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.docs.read().get(&document_key(collection, id)).cloned())
    }
}
