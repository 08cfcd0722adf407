use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::{
    filter::lookup,
    traits::{document_id, is_valid_collection_name},
    DocumentStore, Filter, StoreError,
};
use crate::schema::{CollectionSchema, UniqueIndex};

const ID_INDEX: &str = "_id_";

struct MemoryCollection {
    unique: Vec<UniqueIndex>,
    docs: Vec<Value>,
}

/// In-process store. Documents live only as long as the value.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, MemoryCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, MemoryCollection>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryCollection {
    /// Unique key of `doc` under `index`; `None` when any field is absent or null.
    fn index_key(index: &UniqueIndex, doc: &Value) -> Option<Vec<Value>> {
        index
            .fields
            .iter()
            .map(|field| lookup(doc, field).filter(|v| !v.is_null()).cloned())
            .collect()
    }

    /// Name of the first unique index `doc` would violate, ignoring the slot at `skip`.
    fn violated_index(&self, doc: &Value, skip: Option<usize>) -> Option<&'static str> {
        for index in &self.unique {
            let Some(key) = Self::index_key(index, doc) else {
                continue;
            };
            let clash = self
                .docs
                .iter()
                .enumerate()
                .filter(|(pos, _)| Some(*pos) != skip)
                .any(|(_, other)| Self::index_key(index, other).as_ref() == Some(&key));
            if clash {
                return Some(index.name);
            }
        }
        None
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.docs
            .iter()
            .position(|d| d.get("_id").and_then(Value::as_str) == Some(id))
    }
}

fn unknown(collection: &str) -> StoreError {
    StoreError::UnknownCollection(collection.to_string())
}

fn duplicate(collection: &str, index: &str) -> StoreError {
    StoreError::DuplicateKey {
        collection: collection.to_string(),
        index: index.to_string(),
    }
}

impl DocumentStore for MemoryStore {
    fn register(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        if !is_valid_collection_name(schema.name) {
            return Err(StoreError::InvalidDocument {
                collection: schema.name.to_string(),
                reason: "invalid collection name".to_string(),
            });
        }
        let mut collections = self.lock();
        let entry = collections
            .entry(schema.name.to_string())
            .or_insert_with(|| MemoryCollection {
                unique: Vec::new(),
                docs: Vec::new(),
            });
        entry.unique = schema.unique.to_vec();
        Ok(())
    }

    fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError> {
        let collections = self.lock();
        let coll = collections.get(collection).ok_or_else(|| unknown(collection))?;
        Ok(coll.docs.iter().find(|doc| filter.matches(doc)).cloned())
    }

    fn insert(&self, collection: &str, doc: Value) -> Result<(), StoreError> {
        let id = document_id(collection, &doc)?;
        let mut collections = self.lock();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| unknown(collection))?;
        if coll.position_of(&id).is_some() {
            return Err(duplicate(collection, ID_INDEX));
        }
        if let Some(index) = coll.violated_index(&doc, None) {
            return Err(duplicate(collection, index));
        }
        coll.docs.push(doc);
        Ok(())
    }

    fn save(&self, collection: &str, doc: Value) -> Result<(), StoreError> {
        let id = document_id(collection, &doc)?;
        let mut collections = self.lock();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| unknown(collection))?;
        let existing = coll.position_of(&id);
        if let Some(index) = coll.violated_index(&doc, existing) {
            return Err(duplicate(collection, index));
        }
        match existing {
            Some(pos) => coll.docs[pos] = doc,
            None => coll.docs.push(doc),
        }
        Ok(())
    }

    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let collections = self.lock();
        let coll = collections.get(collection).ok_or_else(|| unknown(collection))?;
        Ok(coll.docs.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PEOPLE: CollectionSchema = CollectionSchema {
        name: "people",
        unique: &[UniqueIndex {
            name: "people_name_uq",
            fields: &["name"],
        }],
    };

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.register(&PEOPLE).unwrap();
        store
    }

    #[test]
    fn operations_on_unregistered_collection_fail() {
        let store = MemoryStore::new();
        let err = store.find_one("people", &Filter::All).unwrap_err();
        assert!(matches!(err, StoreError::UnknownCollection(name) if name == "people"));
    }

    #[test]
    fn insert_rejects_duplicate_unique_field() {
        let store = store();
        store.insert("people", json!({ "_id": "a", "name": "x" })).unwrap();
        let err = store
            .insert("people", json!({ "_id": "b", "name": "x" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref index, .. } if index == "people_name_uq"));
        assert_eq!(store.count("people").unwrap(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let store = store();
        store.insert("people", json!({ "_id": "a", "name": "x" })).unwrap();
        let err = store
            .insert("people", json!({ "_id": "a", "name": "y" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref index, .. } if index == ID_INDEX));
    }

    #[test]
    fn missing_unique_fields_do_not_collide() {
        let store = store();
        store.insert("people", json!({ "_id": "a" })).unwrap();
        store.insert("people", json!({ "_id": "b" })).unwrap();
        assert_eq!(store.count("people").unwrap(), 2);
    }

    #[test]
    fn save_replaces_in_place_and_keeps_order() {
        let store = store();
        store.insert("people", json!({ "_id": "a", "name": "x" })).unwrap();
        store.insert("people", json!({ "_id": "b", "name": "y" })).unwrap();
        store
            .save("people", json!({ "_id": "a", "name": "x", "age": 3 }))
            .unwrap();

        assert_eq!(store.count("people").unwrap(), 2);
        let first = store.find_one("people", &Filter::All).unwrap().unwrap();
        assert_eq!(first["age"], json!(3));
    }

    #[test]
    fn save_enforces_uniqueness_against_other_documents() {
        let store = store();
        store.insert("people", json!({ "_id": "a", "name": "x" })).unwrap();
        store.insert("people", json!({ "_id": "b", "name": "y" })).unwrap();
        let err = store
            .save("people", json!({ "_id": "b", "name": "x" }))
            .unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[test]
    fn insert_requires_string_id() {
        let store = store();
        let err = store.insert("people", json!({ "name": "x" })).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { .. }));
    }
}
