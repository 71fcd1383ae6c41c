//! Statement building for query routes.
//!
//! Turns a query descriptor plus a resolved argument bag into a concrete
//! SQL statement with `$name` bind markers. Pure, so the three statement
//! shapes can be tested without a database.

use crate::error::{PatchbayError, Result};
use crate::params::ArgumentBag;
use crate::routes::{QueryMethod, QueryRoute};
use serde_json::Value;

/// A built statement: SQL text plus the named parameters it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    /// `$`-prefixed bind names with their values, in bind order.
    pub params: Vec<(String, Value)>,
}

/// Build the statement for one query-route invocation.
///
/// `select` produces a full-table select, filtered by all ParamSpec
/// columns ANDed together when the spec is non-empty. `insert` produces a
/// parametrized insert over exactly the ParamSpec columns in declaration
/// order. `query` substitutes `{table}` into the literal template and
/// binds whichever `$name` markers the template references.
pub fn build(
    route: &QueryRoute,
    default_table: Option<&str>,
    resolved: &ArgumentBag,
) -> Result<Statement> {
    let table = route
        .table
        .as_deref()
        .or(default_table)
        .ok_or_else(|| PatchbayError::Config {
            message: format!("Route '{}': no table configured", route.name),
        })?;

    let (sql, bind_names) = match route.method {
        QueryMethod::Select => {
            let columns: Vec<&str> = route.params.keys().map(String::as_str).collect();
            let mut sql = format!("SELECT * FROM {}", table);
            if !columns.is_empty() {
                let filter = columns
                    .iter()
                    .map(|c| format!("{} = ${}", c, c))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                sql.push_str(" WHERE ");
                sql.push_str(&filter);
            }
            (sql, columns.iter().map(|c| c.to_string()).collect())
        }
        QueryMethod::Insert => {
            let columns: Vec<&str> = route.params.keys().map(String::as_str).collect();
            let markers = columns
                .iter()
                .map(|c| format!("${}", c))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({});",
                table,
                columns.join(", "),
                markers
            );
            (sql, columns.iter().map(|c| c.to_string()).collect())
        }
        QueryMethod::Query => {
            // Parse-time validation guarantees the template is present.
            let template = route.query.as_deref().ok_or_else(|| PatchbayError::Config {
                message: format!("Route '{}': missing query template", route.name),
            })?;
            let sql = template.replace("{table}", table);
            let markers = bind_markers(&sql);
            (sql, markers)
        }
    };

    let params = bind_names
        .into_iter()
        .filter_map(|name| {
            resolved
                .get(&name)
                .map(|value| (format!("${}", name), value.clone()))
        })
        .collect();

    Ok(Statement { sql, params })
}

/// Distinct `$name` bind markers in a statement, in order of appearance.
fn bind_markers(sql: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len()
                && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
            {
                end += 1;
            }
            if end > start {
                let name = &sql[start..end];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }

    names
}
