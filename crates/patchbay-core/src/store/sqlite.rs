//! SQLite-backed store.

use super::traits::{Row, Store};
use crate::error::{PatchbayError, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// SQLite store. Thread-safe via an internal mutex on the connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database at the given path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PatchbayError::Io {
                    message: format!("Failed to create database directory: {}", e),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| PatchbayError::Database {
            message: format!("Failed to open database: {}", e),
            source: Some(e),
        })?;

        // WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| PatchbayError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database, private to this store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| PatchbayError::Database {
            message: format!("Failed to open in-memory database: {}", e),
            source: Some(e),
        })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl Store for SqliteStore {
    fn execute(&self, sql: &str, params: &[(String, Value)]) -> Result<Vec<Row>> {
        let conn = self.conn.lock().map_err(|e| PatchbayError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })?;

        debug!("executing: {}", sql);
        let mut stmt = conn.prepare(sql)?;

        for (name, value) in params {
            // Bind markers the statement doesn't reference are skipped.
            if let Some(index) = stmt.parameter_index(name)? {
                stmt.raw_bind_parameter(index, json_to_sql(value))?;
            }
        }

        if stmt.column_count() == 0 {
            stmt.raw_execute()?;
            return Ok(Vec::new());
        }

        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut raw_rows = stmt.raw_query();
        let mut rows = Vec::new();
        while let Some(row) = raw_rows.next()? {
            let mut out = Row::new();
            for (index, column) in columns.iter().enumerate() {
                out.insert(column.clone(), sql_to_json(row.get_ref(index)?));
            }
            rows.push(out);
        }

        Ok(rows)
    }
}

fn json_to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Sql::Integer(i),
            None => Sql::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => Sql::Text(s.clone()),
        // Arrays and objects are stored in their JSON form.
        other => Sql::Text(other.to_string()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store
            .execute(
                "CREATE TABLE games ( id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 name VARCHAR(255), owner_id NUMBER NOT NULL, isComplete BOOLEAN )",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("games.db");
        let store = SqliteStore::open(&path).unwrap();
        store.execute("CREATE TABLE t (x)", &[]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_insert_then_select_round_trip() {
        let store = test_store();

        let rows = store
            .execute(
                "INSERT INTO games (name, owner_id, isComplete) VALUES ($name, $owner_id, $isComplete);",
                &[
                    ("$name".to_string(), json!("Game 1")),
                    ("$owner_id".to_string(), json!(12345)),
                    ("$isComplete".to_string(), json!(false)),
                ],
            )
            .unwrap();
        assert!(rows.is_empty());

        let rows = store.execute("SELECT * FROM games", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Game 1"));
        assert_eq!(rows[0]["owner_id"], json!(12345));
        // Booleans are stored as integers.
        assert_eq!(rows[0]["isComplete"], json!(0));
    }

    #[test]
    fn test_named_filter() {
        let store = test_store();
        for (name, owner) in [("a", 1), ("b", 2)] {
            store
                .execute(
                    "INSERT INTO games (name, owner_id) VALUES ($name, $owner_id)",
                    &[
                        ("$name".to_string(), json!(name)),
                        ("$owner_id".to_string(), json!(owner)),
                    ],
                )
                .unwrap();
        }

        let rows = store
            .execute(
                "SELECT * FROM games WHERE owner_id = $owner_id",
                &[("$owner_id".to_string(), json!(2))],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("b"));
    }

    #[test]
    fn test_unused_bind_markers_are_skipped() {
        let store = test_store();
        store
            .execute(
                "SELECT * FROM games",
                &[("$unused".to_string(), json!(1))],
            )
            .unwrap();
    }

    #[test]
    fn test_bad_sql_is_a_database_error() {
        let store = test_store();
        let err = store.execute("NOT REAL SQL", &[]).unwrap_err();
        assert!(matches!(err, PatchbayError::Database { .. }));
    }
}
