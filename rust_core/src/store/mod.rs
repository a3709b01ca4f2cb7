//! Document storage for feed output.
//!
//! Documents are addressed by `(collection, id)` and written in batches so
//! readers never see a half-updated cycle.

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryStore;
pub use self::redis::RedisDocumentStore;

use crate::models::StoredDocument;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: String,
    pub id: String,
    pub body: serde_json::Value,
}

impl Document {
    /// Wrap `data` in the `{ data, lastUpdated }` envelope.
    pub fn new<T: Serialize>(collection: &str, id: &str, data: T) -> Result<Self> {
        Ok(Self {
            collection: collection.to_string(),
            id: id.to_string(),
            body: serde_json::to_value(StoredDocument::now(data))?,
        })
    }

    pub fn key(&self) -> String {
        document_key(&self.collection, &self.id)
    }
}

pub fn document_key(collection: &str, id: &str) -> String {
    format!("{}:{}", collection, id)
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write all documents or none.
    async fn write_batch(&self, docs: Vec<Document>) -> Result<()>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>>;
}
