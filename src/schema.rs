use serde::{de::DeserializeOwned, Serialize};

use crate::models::{
    Category, Character, ContentCatalog, Image, Item, Series, SeriesCharacter, User,
    UserSpecificData,
};
use crate::storage::{DocumentStore, StoreError};
use crate::types::ObjectId;

/// Uniqueness constraint over one or more top-level fields of a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniqueIndex {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub unique: &'static [UniqueIndex],
}

/// A top-level record persisted in its own collection.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;
    const UNIQUE: &'static [UniqueIndex] = &[];

    fn id(&self) -> ObjectId;

    fn schema() -> CollectionSchema {
        CollectionSchema {
            name: Self::COLLECTION,
            unique: Self::UNIQUE,
        }
    }
}

/// Every collection the store must know about, parents before dependents.
pub fn collections() -> Vec<CollectionSchema> {
    vec![
        User::schema(),
        Category::schema(),
        Series::schema(),
        Character::schema(),
        SeriesCharacter::schema(),
        ContentCatalog::schema(),
        Item::schema(),
        Image::schema(),
        UserSpecificData::schema(),
    ]
}

pub fn register_schema(store: &(impl DocumentStore + ?Sized)) -> Result<(), StoreError> {
    for schema in collections() {
        store.register(&schema)?;
        log::debug!(
            "registered collection {} ({} unique indexes)",
            schema.name,
            schema.unique.len()
        );
    }
    Ok(())
}
