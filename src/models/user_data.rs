use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Document, UniqueIndex};
use crate::types::ObjectId;

/// A user's private view over a shared item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    pub item_id: ObjectId,
    #[serde(default)]
    pub custom_item_images: Vec<ObjectId>,
    #[serde(default)]
    pub custom_item_name: Option<String>,
    #[serde(default)]
    pub custom_item_series_name: Option<ObjectId>,
    #[serde(default)]
    pub custom_item_character_name: Option<ObjectId>,
    #[serde(default)]
    pub custom_item_category_name: Option<ObjectId>,
    #[serde(default)]
    pub custom_item_tags: Vec<String>,
    #[serde(default)]
    pub custom_item_retailer: Option<String>,
    #[serde(default)]
    pub custom_item_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exchange_status: bool,
    #[serde(default)]
    pub own_status: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomCategoryName {
    pub category_id: ObjectId,
    pub custom_category_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomSeriesName {
    pub series_id: ObjectId,
    pub custom_series_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomCharacterName {
    pub character_id: ObjectId,
    pub custom_character_name: String,
}

/// Per-user overlay of renamings and annotations. At most one per user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSpecificData {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub custom_items: Vec<CustomItem>,
    #[serde(default)]
    pub custom_category_names: Vec<CustomCategoryName>,
    #[serde(default)]
    pub custom_series_names: Vec<CustomSeriesName>,
    #[serde(default)]
    pub custom_character_names: Vec<CustomCharacterName>,
}

impl UserSpecificData {
    pub fn new(user_id: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            custom_items: Vec::new(),
            custom_category_names: Vec::new(),
            custom_series_names: Vec::new(),
            custom_character_names: Vec::new(),
        }
    }

    /// Every shared record this overlay points at, as `(collection, id)`.
    pub fn references(&self) -> Vec<(&'static str, ObjectId)> {
        let mut refs = Vec::new();
        for item in &self.custom_items {
            refs.push(("items", item.item_id));
            refs.extend(item.custom_item_images.iter().map(|id| ("images", *id)));
            refs.extend(item.custom_item_series_name.map(|id| ("series", id)));
            refs.extend(item.custom_item_character_name.map(|id| ("characters", id)));
            refs.extend(item.custom_item_category_name.map(|id| ("categories", id)));
        }
        refs.extend(
            self.custom_category_names
                .iter()
                .map(|c| ("categories", c.category_id)),
        );
        refs.extend(self.custom_series_names.iter().map(|s| ("series", s.series_id)));
        refs.extend(
            self.custom_character_names
                .iter()
                .map(|c| ("characters", c.character_id)),
        );
        refs
    }
}

impl Document for UserSpecificData {
    const COLLECTION: &'static str = "user_specific_data";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "user_specific_data_user_id_uq",
        fields: &["user_id"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_cover_every_overlay() {
        let mut data = UserSpecificData::new(ObjectId::new());
        let item = ObjectId::new();
        let category = ObjectId::new();
        data.custom_items.push(CustomItem {
            item_id: item,
            custom_item_images: vec![],
            custom_item_name: Some("mine".into()),
            custom_item_series_name: None,
            custom_item_character_name: None,
            custom_item_category_name: Some(category),
            custom_item_tags: vec![],
            custom_item_retailer: None,
            custom_item_notes: None,
            created_at: None,
            exchange_status: false,
            own_status: true,
        });
        data.custom_category_names.push(CustomCategoryName {
            category_id: category,
            custom_category_name: "renamed".into(),
        });

        let refs = data.references();
        assert_eq!(
            refs,
            vec![("items", item), ("categories", category), ("categories", category)]
        );
    }
}
