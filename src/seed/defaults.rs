//! Fixed values written by the seed pass.

pub const USER_NAME: &str = "Test User";
pub const USER_EMAIL: &str = "test@example.com";
pub const USER_PASSWORD_HASH: &str = "hashed_password";

pub const COLLECTION_LIST_NAME: &str = "Test Collection";

pub const CATEGORY_NAME: &str = "Test Category";
pub const SERIES_NAME: &str = "Test Series";
pub const CHARACTER_NAME: &str = "Test Character";

pub const ITEM_NAME: &str = "Test Item";
pub const ITEM_TAGS: &[&str] = &["#test1", "#test2"];
pub const ITEM_JAN_CODE: &str = "4991567672501";
pub const ITEM_RETAILERS: &[&str] = &["Test Shop"];

pub const IMAGE_URL: &str = "https://example.com/images/image1.jpg";

pub const CUSTOM_ITEM_NAME: &str = "My Test Custom Item";
pub const CUSTOM_ITEM_TAGS: &[&str] = &["Mytag1", "Mytag2"];
pub const CUSTOM_ITEM_RETAILER: &str = "My Test Local Store";
pub const CUSTOM_ITEM_NOTES: &str = "This is a personal note.";
pub const CUSTOM_CATEGORY_NAME: &str = "My Custom Category";
pub const CUSTOM_SERIES_NAME: &str = "My Custom Series";
pub const CUSTOM_CHARACTER_NAME: &str = "My Custom Character";

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
