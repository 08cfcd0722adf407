use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("referential gap: {collection} record {key} required by {dependent} is missing")]
    ReferentialGap {
        dependent: &'static str,
        collection: &'static str,
        key: String,
    },
    #[error("{collection} rejected {key} as a duplicate but no matching record exists")]
    Unresolved {
        collection: &'static str,
        key: String,
    },
}
