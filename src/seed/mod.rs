pub mod defaults;
mod error;
mod report;

pub use error::SeedError;
pub use report::{Outcome, SeedReport, SeedStep};

use chrono::Utc;

use crate::models::{
    Category, Character, CollectionList, ContentCatalog, CustomCategoryName, CustomCharacterName,
    CustomItem, CustomSeriesName, Image, Item, Series, SeriesCharacter, User, UserSpecificData,
};
use crate::schema::{self, Document};
use crate::storage::{DocumentStore, DocumentStoreExt, Filter, StoreError};
use crate::types::ObjectId;
use defaults::strings;
use serde_json::Value;

const COLLECTION_LISTS: &str = "users.collection_lists";

/// Shared catalog records the item and the user overlays point at.
#[derive(Clone, Debug)]
struct CatalogRefs {
    category: Category,
    series: Series,
    character: Character,
}

/// Registers the schema and inserts every default record that is missing.
///
/// Safe to run any number of times, including from several processes at once:
/// records are looked up by natural key first, and an insert rejected by a
/// uniqueness constraint adopts the record that won.
pub fn ensure_seeded<S: DocumentStore + ?Sized>(store: &S) -> Result<SeedReport, SeedError> {
    let _span = tracing::info_span!("ensure_seeded").entered();

    schema::register_schema(store)?;
    let report = Seeder::new(store).run()?;

    log::info!(
        "🌱 Seeding finished: {} created, {} steps",
        report.created(),
        report.steps.len()
    );
    Ok(report)
}

struct Seeder<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    report: SeedReport,
}

impl<'a, S: DocumentStore + ?Sized> Seeder<'a, S> {
    fn new(store: &'a S) -> Self {
        Self {
            store,
            report: SeedReport::default(),
        }
    }

    fn run(mut self) -> Result<SeedReport, SeedError> {
        let user = self.seed_user()?;
        let refs = self.seed_catalog()?;
        let item = self.seed_item(&refs)?;
        let image = self.seed_image(&user, item)?;
        self.seed_user_data(&user, &image, &refs)?;
        self.seed_collection_list(&user, image.item_id)?;
        Ok(self.report)
    }

    /// Looks `key` up with `filter`; inserts `build()` when nothing matches.
    fn find_or_insert<T: Document>(
        &mut self,
        key: &str,
        filter: Filter,
        build: impl FnOnce() -> T,
    ) -> Result<(T, Outcome), SeedError> {
        if let Some(existing) = self.store.find_doc::<T>(&filter)? {
            log::info!(
                "⏭️  {} {:?} already exists, skipping insertion",
                T::COLLECTION,
                key
            );
            self.report.record(T::COLLECTION, key, Outcome::Existing);
            return Ok((existing, Outcome::Existing));
        }

        let doc = build();
        match self.store.insert_doc(&doc) {
            Ok(()) => {
                log::info!("✅ Created {} {:?} ({})", T::COLLECTION, key, doc.id());
                self.report.record(T::COLLECTION, key, Outcome::Created);
                Ok((doc, Outcome::Created))
            }
            Err(e) if e.is_duplicate_key() => {
                log::warn!(
                    "{} {:?} was inserted concurrently ({}), skipping insertion",
                    T::COLLECTION,
                    key,
                    e
                );
                let winner = match self.store.find_doc::<T>(&filter)? {
                    Some(winner) => Some(winner),
                    None => self.find_conflicting(&doc, &e)?,
                };
                let winner = winner.ok_or_else(|| SeedError::Unresolved {
                    collection: T::COLLECTION,
                    key: key.to_string(),
                })?;
                self.report.record(T::COLLECTION, key, Outcome::Raced);
                Ok((winner, Outcome::Raced))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finds the record that holds `doc`'s key under the index named by a
    /// duplicate-key error. The natural-key filter misses it when another
    /// index (a user's email, say) caused the rejection.
    fn find_conflicting<T: Document>(
        &self,
        doc: &T,
        err: &StoreError,
    ) -> Result<Option<T>, SeedError> {
        let StoreError::DuplicateKey { index, .. } = err else {
            return Ok(None);
        };
        let filter = match T::UNIQUE.iter().find(|u| u.name == index.as_str()) {
            Some(unique) => {
                let body = serde_json::to_value(doc).map_err(StoreError::from)?;
                Filter::and(
                    unique
                        .fields
                        .iter()
                        .map(|field| {
                            let value = body.get(*field).cloned().unwrap_or(Value::Null);
                            Filter::eq(field, value)
                        })
                        .collect(),
                )
            }
            None => Filter::by_id(doc.id()),
        };
        log::debug!("looking up {} winner by index {}", T::COLLECTION, index);
        Ok(self.store.find_doc::<T>(&filter)?)
    }

    /// Fails with `ReferentialGap` unless `collection` holds a record with `id`.
    fn require(
        &self,
        dependent: &'static str,
        collection: &'static str,
        id: ObjectId,
    ) -> Result<(), SeedError> {
        match self.store.find_one(collection, &Filter::by_id(id))? {
            Some(_) => Ok(()),
            None => Err(SeedError::ReferentialGap {
                dependent,
                collection,
                key: id.to_hex(),
            }),
        }
    }

    fn seed_user(&mut self) -> Result<User, SeedError> {
        let (user, _) = self.find_or_insert(
            defaults::USER_NAME,
            Filter::eq("user_name", defaults::USER_NAME),
            || {
                User::new(
                    defaults::USER_NAME,
                    defaults::USER_EMAIL,
                    defaults::USER_PASSWORD_HASH,
                )
            },
        )?;
        Ok(user)
    }

    /// Seeds the standalone catalog records and mirrors the newly created ones
    /// into the catalog aggregate, which is written at most once per pass.
    fn seed_catalog(&mut self) -> Result<CatalogRefs, SeedError> {
        let (mut catalog, catalog_is_new) = match self.store.find_doc::<ContentCatalog>(&Filter::All)? {
            Some(catalog) => (catalog, false),
            None => (ContentCatalog::new(), true),
        };
        let entries_before = catalog.len();

        // Records inserted before a failure still go into the aggregate.
        let seeded = self.seed_catalog_records(&mut catalog);
        let added = catalog.len() - entries_before;
        if added > 0 || (catalog_is_new && seeded.is_ok()) {
            match self.save_catalog(catalog, added) {
                Ok(()) => {}
                Err(e) if seeded.is_ok() => return Err(e),
                Err(e) => log::error!("Failed to save content catalog after an aborted step: {e}"),
            }
        }
        seeded
    }

    fn seed_catalog_records(
        &mut self,
        catalog: &mut ContentCatalog,
    ) -> Result<CatalogRefs, SeedError> {
        let (category, outcome) = self.find_or_insert(
            defaults::CATEGORY_NAME,
            Filter::eq("category_name", defaults::CATEGORY_NAME),
            || Category::new(defaults::CATEGORY_NAME),
        )?;
        if outcome == Outcome::Created {
            catalog.categories.push(category.clone());
        }

        let (series, outcome) = self.find_or_insert(
            defaults::SERIES_NAME,
            Filter::eq("series_name", defaults::SERIES_NAME),
            || Series::new(defaults::SERIES_NAME),
        )?;
        if outcome == Outcome::Created {
            catalog.series.push(series.clone());
        }

        let series_id = series.id;
        let (character, outcome) = self.find_or_insert(
            defaults::CHARACTER_NAME,
            Filter::eq("character_name", defaults::CHARACTER_NAME),
            || Character::new(defaults::CHARACTER_NAME, Some(series_id)),
        )?;
        if outcome == Outcome::Created {
            catalog.characters.push(character.clone());
        }

        let pair_key = format!("{}/{}", series.id, character.id);
        let (pair, outcome) = self.find_or_insert(
            &pair_key,
            Filter::and(vec![
                Filter::eq("series_id", series.id.to_hex()),
                Filter::eq("character_id", character.id.to_hex()),
            ]),
            || SeriesCharacter::new(series.id, character.id),
        )?;
        if outcome == Outcome::Created {
            catalog.series_characters.push(pair);
        }

        Ok(CatalogRefs {
            category,
            series,
            character,
        })
    }

    /// Merges `catalog` into whatever copy is stored under its id, then saves.
    fn save_catalog(&mut self, catalog: ContentCatalog, added: usize) -> Result<(), SeedError> {
        let merged = match self.store.find_by_id::<ContentCatalog>(catalog.id)? {
            Some(mut stored) => {
                stored.absorb(catalog);
                stored
            }
            None => catalog,
        };
        self.store.save_doc(&merged)?;
        self.report.catalog_saved = true;
        log::info!("📚 Saved content catalog {} (+{} entries)", merged.id, added);
        Ok(())
    }

    fn seed_item(&mut self, refs: &CatalogRefs) -> Result<Item, SeedError> {
        self.require(Item::COLLECTION, Category::COLLECTION, refs.category.id)?;
        self.require(Item::COLLECTION, Series::COLLECTION, refs.series.id)?;
        self.require(Item::COLLECTION, Character::COLLECTION, refs.character.id)?;

        let (item, _) = self.find_or_insert(
            defaults::ITEM_NAME,
            Filter::eq("item_name", defaults::ITEM_NAME),
            || {
                let mut item = Item::new(defaults::ITEM_NAME);
                item.item_series = Some(refs.series.id);
                item.item_character = Some(refs.character.id);
                item.category = Some(refs.category.id);
                item.tags = strings(defaults::ITEM_TAGS);
                item.jan_code = Some(defaults::ITEM_JAN_CODE.to_string());
                item.retailers = strings(defaults::ITEM_RETAILERS);
                item
            },
        )?;
        Ok(item)
    }

    /// Seeds the item's image, then links it from the item if not yet linked.
    fn seed_image(&mut self, user: &User, mut item: Item) -> Result<Image, SeedError> {
        self.require(Image::COLLECTION, User::COLLECTION, user.id)?;
        self.require(Image::COLLECTION, Item::COLLECTION, item.id)?;

        let (image, _) = self.find_or_insert(
            defaults::IMAGE_URL,
            Filter::eq("image_url", defaults::IMAGE_URL),
            || Image::new(user.id, item.id, defaults::IMAGE_URL),
        )?;

        if item.add_image(image.id) {
            self.store.save_doc(&item)?;
            log::info!("🖼️  Linked image {} to item {:?}", image.id, item.item_name);
        }
        Ok(image)
    }

    fn seed_user_data(
        &mut self,
        user: &User,
        image: &Image,
        refs: &CatalogRefs,
    ) -> Result<UserSpecificData, SeedError> {
        let candidate = {
            let mut data = UserSpecificData::new(user.id);
            data.custom_items.push(CustomItem {
                item_id: image.item_id,
                custom_item_images: vec![image.id],
                custom_item_name: Some(defaults::CUSTOM_ITEM_NAME.to_string()),
                custom_item_series_name: Some(refs.series.id),
                custom_item_character_name: Some(refs.character.id),
                custom_item_category_name: Some(refs.category.id),
                custom_item_tags: strings(defaults::CUSTOM_ITEM_TAGS),
                custom_item_retailer: Some(defaults::CUSTOM_ITEM_RETAILER.to_string()),
                custom_item_notes: Some(defaults::CUSTOM_ITEM_NOTES.to_string()),
                created_at: Some(Utc::now()),
                exchange_status: false,
                own_status: true,
            });
            data.custom_category_names.push(CustomCategoryName {
                category_id: refs.category.id,
                custom_category_name: defaults::CUSTOM_CATEGORY_NAME.to_string(),
            });
            data.custom_series_names.push(CustomSeriesName {
                series_id: refs.series.id,
                custom_series_name: defaults::CUSTOM_SERIES_NAME.to_string(),
            });
            data.custom_character_names.push(CustomCharacterName {
                character_id: refs.character.id,
                custom_character_name: defaults::CUSTOM_CHARACTER_NAME.to_string(),
            });
            data
        };

        for (collection, id) in candidate.references() {
            self.require(UserSpecificData::COLLECTION, collection, id)?;
        }

        let (data, _) = self.find_or_insert(
            &user.user_name,
            Filter::eq("user_id", user.id.to_hex()),
            || candidate,
        )?;
        Ok(data)
    }

    /// Collection lists are embedded in their owner, so existence is checked
    /// across every user's lists rather than in a collection of their own.
    fn seed_collection_list(&mut self, user: &User, item_id: ObjectId) -> Result<(), SeedError> {
        let name = defaults::COLLECTION_LIST_NAME;
        let owned_by_someone = self
            .store
            .find_one(
                User::COLLECTION,
                &Filter::elem_match("collection_lists", Filter::eq("list_name", name)),
            )?
            .is_some();
        if owned_by_someone {
            log::info!("⏭️  Collection list {:?} already exists, skipping insertion", name);
            self.report.record(COLLECTION_LISTS, name, Outcome::Existing);
            return Ok(());
        }

        self.require(COLLECTION_LISTS, Item::COLLECTION, item_id)?;
        let mut owner = self
            .store
            .find_by_id::<User>(user.id)?
            .ok_or_else(|| SeedError::ReferentialGap {
                dependent: COLLECTION_LISTS,
                collection: User::COLLECTION,
                key: user.id.to_hex(),
            })?;

        let outcome = if owner.add_collection_list(CollectionList::new(name, vec![item_id])) {
            self.store.save_doc(&owner)?;
            log::info!("✅ Created collection list {:?} for {:?}", name, owner.user_name);
            Outcome::Created
        } else {
            Outcome::Existing
        };
        self.report.record(COLLECTION_LISTS, name, outcome);
        Ok(())
    }
}
