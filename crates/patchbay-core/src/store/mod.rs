//! Data-store collaborator interface and the sqlite backend.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Row, Store};

use crate::config::DatabaseSection;
use crate::error::{PatchbayError, Result};
use std::path::Path;
use std::sync::Arc;

/// Default database file when the configuration names none.
const DEFAULT_SQLITE_PATH: &str = "sqlite3.db";

/// Open the store backend named by the database configuration.
///
/// Only `sqlite` is supported; anything else is an `UnsupportedBackend`
/// error so a config typo fails at startup, not on the first query.
pub fn open_store(config: &DatabaseSection) -> Result<Arc<dyn Store>> {
    match config.kind.as_str() {
        "sqlite" => {
            let path = config
                .path
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_SQLITE_PATH));
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        other => Err(PatchbayError::UnsupportedBackend {
            backend: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_backend_is_rejected() {
        let config = DatabaseSection {
            kind: "mongodb".into(),
            table: None,
            path: None,
        };
        let err = open_store(&config).err().unwrap();
        assert!(matches!(
            err,
            PatchbayError::UnsupportedBackend { ref backend } if backend == "mongodb"
        ));
    }
}
