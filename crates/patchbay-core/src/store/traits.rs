//! Data-store collaborator trait.

use crate::error::Result;
use serde_json::{Map, Value};

/// One result row, column name -> JSON value.
pub type Row = Map<String, Value>;

/// Statement executor consumed by query bindings.
///
/// Operations are synchronous to match rusqlite's API; async backends
/// can block in place behind this seam.
pub trait Store: Send + Sync {
    /// Execute a statement with `$name` parameters and return all result
    /// rows. Statements that produce no rows (insert, create) return an
    /// empty row set.
    fn execute(&self, sql: &str, params: &[(String, Value)]) -> Result<Vec<Row>>;
}
