mod error;
pub mod filter;
pub mod memory;
pub mod sqlite;
pub mod traits;

use std::path::PathBuf;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use url::Url;

pub use error::StoreError;
pub use filter::Filter;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{DocumentStore, DocumentStoreExt};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

impl StoreLocation {
    /// Accepts `memory://` and `sqlite://<path>` (`sqlite:///abs/path` for absolute paths).
    pub fn parse(uri: &str) -> Result<Self, StoreError> {
        let failure = |reason: String| StoreError::ConnectionFailure {
            uri: uri.to_string(),
            reason,
        };
        let url = Url::parse(uri).map_err(|e| failure(e.to_string()))?;
        match url.scheme() {
            "memory" => Ok(StoreLocation::Memory),
            "sqlite" => {
                let encoded = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
                let path = percent_decode_str(&encoded)
                    .decode_utf8()
                    .map_err(|e| failure(format!("database path is not UTF-8: {e}")))?;
                if path.is_empty() || path == "/" {
                    return Err(failure("missing database path".to_string()));
                }
                Ok(StoreLocation::Sqlite(PathBuf::from(path.into_owned())))
            }
            other => Err(failure(format!("unsupported scheme {other:?}"))),
        }
    }
}

/// Opens the store behind `uri`. Every failure is a `ConnectionFailure`.
pub fn connect(uri: &str, reset: bool) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let failure = |reason: String| StoreError::ConnectionFailure {
        uri: uri.to_string(),
        reason,
    };

    match StoreLocation::parse(uri)? {
        StoreLocation::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreLocation::Sqlite(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| failure(e.to_string()))?;
            }
            let sqlite = SqliteStore::new(&path);
            if reset {
                sqlite.reset_all().map_err(|e| failure(e.to_string()))?;
            }
            sqlite.init().map_err(|e| failure(e.to_string()))?;
            Ok(Arc::new(sqlite))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_memory_uri() {
        assert_eq!(StoreLocation::parse("memory://").unwrap(), StoreLocation::Memory);
    }

    #[test]
    fn parses_relative_and_absolute_sqlite_paths() {
        assert_eq!(
            StoreLocation::parse("sqlite://.collectibles/collectibles.sqlite").unwrap(),
            StoreLocation::Sqlite(PathBuf::from(".collectibles/collectibles.sqlite"))
        );
        assert_eq!(
            StoreLocation::parse("sqlite:///tmp/store.sqlite").unwrap(),
            StoreLocation::Sqlite(PathBuf::from("/tmp/store.sqlite"))
        );
    }

    #[test]
    fn decodes_escaped_characters_in_sqlite_paths() {
        assert_eq!(
            StoreLocation::parse("sqlite:///tmp/my dir/x.db").unwrap(),
            StoreLocation::Sqlite(PathBuf::from("/tmp/my dir/x.db"))
        );
        assert_eq!(
            StoreLocation::parse("sqlite:///tmp/my%20dir/x.db").unwrap(),
            StoreLocation::Sqlite(PathBuf::from("/tmp/my dir/x.db"))
        );
        assert_eq!(
            StoreLocation::parse("sqlite://.collectibles/my store.sqlite").unwrap(),
            StoreLocation::Sqlite(PathBuf::from(".collectibles/my store.sqlite"))
        );
    }

    #[test]
    fn connect_opens_the_decoded_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("with space/store.sqlite");
        let uri = format!("sqlite://{}", path.display());
        connect(&uri, false).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("with%20space").exists());
    }

    #[test]
    fn rejects_unknown_scheme_as_connection_failure() {
        let err = StoreLocation::parse("mongodb://localhost:27017").unwrap_err();
        assert!(matches!(err, StoreError::ConnectionFailure { ref reason, .. } if reason.contains("mongodb")));
    }

    #[test]
    fn rejects_sqlite_uri_without_path() {
        let err = StoreLocation::parse("sqlite://").unwrap_err();
        assert!(matches!(err, StoreError::ConnectionFailure { .. }));
    }

    #[test]
    fn connect_fails_when_database_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let uri = format!("sqlite://{}", dir.path().display());
        let err = connect(&uri, false).err().expect("directory is not a database");
        assert!(matches!(err, StoreError::ConnectionFailure { .. }));
    }

    #[test]
    fn connect_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.sqlite");
        let uri = format!("sqlite://{}", path.display());
        connect(&uri, false).unwrap();
        assert!(path.exists());
    }
}
