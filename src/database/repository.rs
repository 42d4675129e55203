use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::object_id::ObjectId;
use super::store::{DocumentStore, StoreError};

/// A record type stored as one document in a named collection
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> &ObjectId;
}

/// Typed accessor over a single collection of the document store.
///
/// Cheap to build: handlers construct one per request from the shared store
/// handle held in application state.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn exists(&self, id: &ObjectId) -> Result<bool, StoreError> {
        self.store.exists(T::COLLECTION, id).await
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn insert(&self, record: &T) -> Result<(), StoreError> {
        let document = serde_json::to_value(record)?;
        self.store.insert(T::COLLECTION, record.id(), document).await
    }

    /// Overwrite the top-level fields present in `changes`; `None` if absent
    pub async fn update_by_id<U: Serialize>(&self, id: &ObjectId, changes: &U) -> Result<Option<T>, StoreError> {
        let fields = match serde_json::to_value(changes)? {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::MalformedDocument {
                    collection: T::COLLECTION.to_string(),
                    message: "update must serialize to a JSON object".to_string(),
                })
            }
        };
        self.update_fields(id, fields).await
    }

    pub async fn update_fields(&self, id: &ObjectId, fields: Map<String, Value>) -> Result<Option<T>, StoreError> {
        self.store
            .update_by_id(T::COLLECTION, id, fields)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn delete_by_id(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        self.store
            .delete_by_id(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    fn decode(document: Value) -> Result<T, StoreError> {
        serde_json::from_value(document).map_err(|e| StoreError::MalformedDocument {
            collection: T::COLLECTION.to_string(),
            message: e.to_string(),
        })
    }
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _phantom: PhantomData,
        }
    }
}
