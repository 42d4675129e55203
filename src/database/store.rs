use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::object_id::ObjectId;

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Document already exists: {0}")]
    Duplicate(String),

    #[error("Malformed document in {collection}: {message}")]
    MalformedDocument { collection: String, message: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schema-flexible storage of JSON documents keyed by collection and id.
///
/// Every call is a single round trip. Implementations must be safe to share
/// across requests; they impose no ordering between concurrent writers, so two
/// updates of the same document resolve last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn exists(&self, collection: &str, id: &ObjectId) -> Result<bool, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Value>, StoreError>;

    /// Insert a new document; fails with `Duplicate` when the id is taken
    async fn insert(&self, collection: &str, id: &ObjectId, document: Value) -> Result<(), StoreError>;

    /// Merge `fields` into the top level of the stored document and return the
    /// updated document, or `None` when no document has this id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Remove the document permanently, returning what was removed
    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Value>, StoreError>;

    /// Cheap liveness probe for /health
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release backend resources on shutdown
    async fn close(&self) {}
}

/// Collection names end up in SQL identifiers, so only [a-z0-9_] is accepted
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
