mod catalog;
mod image;
mod item;
mod user;
mod user_data;

pub use catalog::{Category, Character, ContentCatalog, Series, SeriesCharacter};
pub use image::Image;
pub use item::Item;
pub use user::{CollectionList, User};
pub use user_data::{
    CustomCategoryName, CustomCharacterName, CustomItem, CustomSeriesName, UserSpecificData,
};
