use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::{Document, UniqueIndex};
use crate::types::ObjectId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub item_name: String,
    #[serde(default)]
    pub item_images: Vec<ObjectId>,
    #[serde(default)]
    pub item_series: Option<ObjectId>,
    #[serde(default)]
    pub item_character: Option<ObjectId>,
    #[serde(default)]
    pub category: Option<ObjectId>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// JAN/EAN barcode printed on the package.
    #[serde(default)]
    pub jan_code: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub retailers: Vec<String>,
}

impl Item {
    pub fn new(item_name: &str) -> Self {
        Self {
            id: ObjectId::new(),
            item_name: item_name.to_string(),
            item_images: Vec::new(),
            item_series: None,
            item_character: None,
            category: None,
            tags: Vec::new(),
            jan_code: None,
            release_date: None,
            retailers: Vec::new(),
        }
    }

    pub fn add_image(&mut self, image_id: ObjectId) -> bool {
        if self.item_images.contains(&image_id) {
            return false;
        }
        self.item_images.push(image_id);
        true
    }
}

impl Document for Item {
    const COLLECTION: &'static str = "items";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "items_item_name_uq",
        fields: &["item_name"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}
