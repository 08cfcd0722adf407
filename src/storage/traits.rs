use serde_json::Value;

use super::{Filter, StoreError};
use crate::schema::{CollectionSchema, Document};
use crate::types::ObjectId;

/// Generic JSON document store with per-collection uniqueness constraints.
pub trait DocumentStore: Send + Sync {
    /// Creates the collection and its unique indexes if missing.
    fn register(&self, schema: &CollectionSchema) -> Result<(), StoreError>;
    fn collection_names(&self) -> Result<Vec<String>, StoreError>;
    /// First matching document in insertion order.
    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError>;
    fn insert(&self, collection: &str, doc: Value) -> Result<(), StoreError>;
    /// Insert-or-replace keyed by `_id`.
    fn save(&self, collection: &str, doc: Value) -> Result<(), StoreError>;
    fn count(&self, collection: &str) -> Result<u64, StoreError>;
}

pub trait DocumentStoreExt: DocumentStore {
    fn find_doc<T: Document>(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        self.find_one(T::COLLECTION, filter)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    fn find_by_id<T: Document>(&self, id: ObjectId) -> Result<Option<T>, StoreError> {
        self.find_doc(&Filter::by_id(id))
    }

    fn exists<T: Document>(&self, id: ObjectId) -> Result<bool, StoreError> {
        Ok(self.find_one(T::COLLECTION, &Filter::by_id(id))?.is_some())
    }

    fn insert_doc<T: Document>(&self, doc: &T) -> Result<(), StoreError> {
        self.insert(T::COLLECTION, serde_json::to_value(doc)?)
    }

    fn save_doc<T: Document>(&self, doc: &T) -> Result<(), StoreError> {
        self.save(T::COLLECTION, serde_json::to_value(doc)?)
    }

    fn count_of<T: Document>(&self) -> Result<u64, StoreError> {
        self.count(T::COLLECTION)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}

pub(crate) fn document_id(collection: &str, doc: &Value) -> Result<String, StoreError> {
    doc.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidDocument {
            collection: collection.to_string(),
            reason: "missing string _id".to_string(),
        })
}

pub(crate) fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
