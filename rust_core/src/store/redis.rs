use super::{document_key, Document, DocumentStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::debug;

/// Stores each document as a JSON string at `<collection>:<id>` and announces
/// writes on `<collection>:<id>:updated` for subscribers.
///
/// The connection manager reconnects after Redis restarts, so a dropped
/// socket fails the current write only.
#[derive(Clone)]
pub struct RedisDocumentStore {
    client: Client,
    connection: ConnectionManager,
}

impl RedisDocumentStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("Invalid Redis URL")?;
        let connection = ConnectionManager::new(client.clone())
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self { client, connection })
    }

    /// Client for opening dedicated connections, e.g. pub/sub subscribers.
    pub fn get_client(&self) -> Client {
        self.client.clone()
    }

    /// Channel a subscriber listens on for updates of one document.
    pub fn update_channel(collection: &str, id: &str) -> String {
        format!("{}:updated", document_key(collection, id))
    }
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn write_batch(&self, docs: Vec<Document>) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for doc in &docs {
            let key = doc.key();
            let payload = serde_json::to_string(&doc.body)?;
            pipe.set(&key, payload).ignore();
            pipe.publish(Self::update_channel(&doc.collection, &doc.id), &key)
                .ignore();
        }

        let mut conn = self.connection.clone();
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .context("Failed to write document batch")?;

        debug!("Wrote {} documents to Redis", docs.len());
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(document_key(collection, id))
            .await
            .context("Failed to read document")?;

        raw.map(|s| serde_json::from_str(&s).context("Stored document is not valid JSON"))
            .transpose()
    }
}
