use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Document, UniqueIndex};
use crate::types::ObjectId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub item_id: ObjectId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_background: bool,
}

impl Image {
    pub fn new(user_id: ObjectId, item_id: ObjectId, image_url: &str) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            item_id,
            image_url: image_url.to_string(),
            created_at: Utc::now(),
            is_background: false,
        }
    }
}

impl Document for Image {
    const COLLECTION: &'static str = "images";
    const UNIQUE: &'static [UniqueIndex] = &[UniqueIndex {
        name: "images_image_url_uq",
        fields: &["image_url"],
    }];

    fn id(&self) -> ObjectId {
        self.id
    }
}
