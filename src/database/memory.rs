use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::object_id::ObjectId;
use super::store::{is_valid_collection_name, DocumentStore, StoreError};

type Collection = BTreeMap<ObjectId, Map<String, Value>>;

/// In-process document store used by the test suite and `STORE_BACKEND=memory`
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    fn check_collection(collection: &str) -> Result<(), StoreError> {
        if is_valid_collection_name(collection) {
            Ok(())
        } else {
            Err(StoreError::InvalidCollection(collection.to_string()))
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn exists(&self, collection: &str, id: &ObjectId) -> Result<bool, StoreError> {
        Self::check_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .is_some_and(|c| c.contains_key(id)))
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Value>, StoreError> {
        Self::check_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|doc| Value::Object(doc.clone())))
    }

    async fn insert(&self, collection: &str, id: &ObjectId, document: Value) -> Result<(), StoreError> {
        Self::check_collection(collection)?;
        let Value::Object(document) = document else {
            return Err(StoreError::MalformedDocument {
                collection: collection.to_string(),
                message: "document must be a JSON object".to_string(),
            });
        };

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        docs.insert(*id, document);
        Ok(())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        Self::check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections.get_mut(collection).and_then(|c| c.get_mut(id)) else {
            return Ok(None);
        };

        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(Some(Value::Object(doc.clone())))
    }

    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Value>, StoreError> {
        Self::check_collection(collection)?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .map(Value::Object))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
