use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Document, UniqueIndex};
use crate::types::ObjectId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_name: String,
    pub email: String,
    /// Password hash, never the plain password.
    pub password: String,
    #[serde(default)]
    pub bg_image_id: Option<ObjectId>,
    #[serde(default)]
    pub collection_lists: Vec<CollectionList>,
}

/// Ordered list of items curated by a user. Only exists embedded in its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionList {
    pub list_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub list_items: Vec<ObjectId>,
}

impl User {
    pub fn new(user_name: &str, email: &str, password_hash: &str) -> Self {
        Self {
            id: ObjectId::new(),
            user_name: user_name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            bg_image_id: None,
            collection_lists: Vec::new(),
        }
    }

    pub fn collection_list(&self, list_name: &str) -> Option<&CollectionList> {
        self.collection_lists
            .iter()
            .find(|list| list.list_name == list_name)
    }

    /// Appends `list` unless the user already owns a list with the same name.
    pub fn add_collection_list(&mut self, list: CollectionList) -> bool {
        if self.collection_list(&list.list_name).is_some() {
            return false;
        }
        self.collection_lists.push(list);
        true
    }
}

impl CollectionList {
    pub fn new(list_name: &str, list_items: Vec<ObjectId>) -> Self {
        Self {
            list_name: list_name.to_string(),
            created_at: Some(Utc::now()),
            list_items,
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE: &'static [UniqueIndex] = &[
        UniqueIndex {
            name: "users_user_name_uq",
            fields: &["user_name"],
        },
        UniqueIndex {
            name: "users_email_uq",
            fields: &["email"],
        },
    ];

    fn id(&self) -> ObjectId {
        self.id
    }
}
