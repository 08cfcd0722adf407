use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot connect to store {uri}: {reason}")]
    ConnectionFailure { uri: String, reason: String },
    #[error("duplicate key in {collection} (index {index})")]
    DuplicateKey { collection: String, index: String },
    #[error("collection {0} is not registered")]
    UnknownCollection(String),
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid document for {collection}: {reason}")]
    InvalidDocument { collection: String, reason: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}
