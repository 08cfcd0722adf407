use serde::{Deserialize, Serialize};

use crate::schema::{Document, UniqueIndex};
use crate::types::ObjectId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub category_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub series_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub character_name: String,
    #[serde(default)]
    pub series_id: Option<ObjectId>,
}

/// Pairs a character with a series it appears in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesCharacter {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub series_id: ObjectId,
    pub character_id: ObjectId,
}

/// Denormalized snapshot of the shared catalog, kept for single-read listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentCatalog {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub series_characters: Vec<SeriesCharacter>,
}

impl Category {
    pub fn new(category_name: &str) -> Self {
        Self {
            id: ObjectId::new(),
            category_name: category_name.to_string(),
        }
    }
}

impl Series {
    pub fn new(series_name: &str) -> Self {
        Self {
            id: ObjectId::new(),
            series_name: series_name.to_string(),
        }
    }
}

impl Character {
    pub fn new(character_name: &str, series_id: Option<ObjectId>) -> Self {
        Self {
            id: ObjectId::new(),
            character_name: character_name.to_string(),
            series_id,
        }
    }
}

impl SeriesCharacter {
    pub fn new(series_id: ObjectId, character_id: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            series_id,
            character_id,
        }
    }
}

impl ContentCatalog {
    /// Id every process gives a fresh catalog, so concurrent first saves
    /// upsert one document.
    pub const SINGLETON_ID: ObjectId = ObjectId::from_bytes(*b"catalog\0\0\0\0\x01");

    pub fn new() -> Self {
        Self {
            id: Self::SINGLETON_ID,
            categories: Vec::new(),
            series: Vec::new(),
            characters: Vec::new(),
            series_characters: Vec::new(),
        }
    }

    /// Appends the entries of `other` whose ids are not present yet.
    pub fn absorb(&mut self, other: ContentCatalog) {
        fn extend<T: Document>(into: &mut Vec<T>, from: Vec<T>) {
            for entry in from {
                if !into.iter().any(|e| e.id() == entry.id()) {
                    into.push(entry);
                }
            }
        }
        extend(&mut self.categories, other.categories);
        extend(&mut self.series, other.series);
        extend(&mut self.characters, other.characters);
        extend(&mut self.series_characters, other.series_characters);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
            + self.series.len()
            + self.characters.len()
            + self.series_characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "categories_category_name_uq",
        fields: &["category_name"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Document for Series {
    const COLLECTION: &'static str = "series";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "series_series_name_uq",
        fields: &["series_name"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Document for Character {
    const COLLECTION: &'static str = "characters";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "characters_character_name_uq",
        fields: &["character_name"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Document for SeriesCharacter {
    const COLLECTION: &'static str = "series_characters";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "series_characters_pair_uq",
        fields: &["series_id", "character_id"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Default for ContentCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for ContentCatalog {
    const COLLECTION: &'static str = "content_catalogs";

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_len_counts_all_sub_collections() {
        let mut catalog = ContentCatalog::new();
        assert!(catalog.is_empty());
        let series = Series::new("S");
        let character = Character::new("C", Some(series.id));
        catalog
            .series_characters
            .push(SeriesCharacter::new(series.id, character.id));
        catalog.series.push(series);
        catalog.characters.push(character);
        catalog.categories.push(Category::new("K"));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn fresh_catalogs_share_one_id() {
        assert_eq!(ContentCatalog::new().id, ContentCatalog::new().id);
        assert_eq!(ContentCatalog::SINGLETON_ID.to_hex().len(), 24);
    }

    #[test]
    fn absorb_skips_entries_already_present() {
        let shared = Category::new("Shared");
        let mut stored = ContentCatalog::new();
        stored.categories.push(shared.clone());

        let mut ours = ContentCatalog::new();
        ours.categories.push(shared);
        ours.series.push(Series::new("Ours"));
        stored.absorb(ours);

        assert_eq!(stored.categories.len(), 1);
        assert_eq!(stored.series.len(), 1);
    }

    #[test]
    fn catalog_deserializes_with_missing_sub_collections() {
        let value = serde_json::json!({ "_id": "64f93b28dcadf9d53f99ef44" });
        let catalog: ContentCatalog = serde_json::from_value(value).unwrap();
        assert!(catalog.is_empty());
    }
}
