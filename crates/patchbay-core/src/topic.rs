//! Topic templating.
//!
//! A topic pattern is a string with `{name}` placeholders, no nesting.
//! Rendering substitutes every occurrence of each placeholder with the
//! stringified argument value and prepends the configured prefix. Pure:
//! the same inputs always produce the same output.

use crate::error::{PatchbayError, Result};
use crate::params::ArgumentBag;
use serde_json::Value;

/// Extract the distinct placeholder names from a pattern, in order of
/// first appearance.
///
/// A placeholder is any non-empty run of characters between a `{` and the
/// next `}`. An empty `{}` is left as literal text.
pub fn placeholders(pattern: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        rest = &rest[open + 1..];
        let Some(close) = rest.find('}') else {
            break;
        };
        let name = &rest[..close];
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &rest[close + 1..];
    }

    names
}

/// Render a pattern into a concrete topic, prefix prepended literally.
///
/// Every placeholder must have a non-null argument; string values render
/// bare, other values render in their JSON form (so `1` becomes `"1"`).
pub fn render(prefix: &str, pattern: &str, args: &ArgumentBag) -> Result<String> {
    let mut topic = pattern.to_string();

    for name in placeholders(pattern) {
        let value = args
            .get(&name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| PatchbayError::UnresolvedPlaceholder { name: name.clone() })?;
        topic = topic.replace(&format!("{{{}}}", name), &stringify(value));
    }

    Ok(format!("{}{}", prefix, topic))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
