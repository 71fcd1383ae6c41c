//! ParamSpec resolution.
//!
//! A ParamSpec maps parameter names to either `null` ("required") or a
//! concrete default. Resolution merges a caller-supplied argument bag
//! against the spec and either produces a fully-defaulted bag or fails on
//! the first missing required parameter. The same function runs on both
//! the calling and the serving side, so a route behaves identically no
//! matter which side validates first.

use crate::error::{PatchbayError, Result};
use serde_json::{Map, Value};

/// Parameter name -> `Value::Null` (required) or default value.
///
/// Declaration order is preserved and significant: insert statements take
/// their column order from it.
pub type ParamSpec = Map<String, Value>;

/// Caller-supplied arguments for one invocation.
pub type ArgumentBag = Map<String, Value>;

/// Validate and default an argument bag against a spec.
///
/// Caller-supplied values win over defaults; absent or `null` values fall
/// back to the default; a required parameter that is absent or `null`
/// fails. Keys the spec does not mention pass through untouched. An empty
/// spec accepts anything, including a missing bag.
pub fn resolve(spec: &ParamSpec, args: Option<&ArgumentBag>) -> Result<ArgumentBag> {
    let mut resolved = args.cloned().unwrap_or_default();

    for (name, default) in spec {
        let missing = resolved.get(name).map_or(true, Value::is_null);
        if missing {
            if default.is_null() {
                return Err(PatchbayError::MissingRequiredParameter { name: name.clone() });
            }
            resolved.insert(name.clone(), default.clone());
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> ParamSpec {
        value.as_object().unwrap().clone()
    }

    fn bag(value: Value) -> ArgumentBag {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_missing_required_parameter_fails() {
        let spec = spec(json!({"game_id": null}));
        let err = resolve(&spec, Some(&bag(json!({})))).unwrap_err();
        assert!(matches!(
            err,
            PatchbayError::MissingRequiredParameter { ref name } if name == "game_id"
        ));

        // An absent bag fails the same way.
        let err = resolve(&spec, None).unwrap_err();
        assert!(err.to_string().contains("game_id"));
    }

    #[test]
    fn test_null_counts_as_missing_for_required() {
        let spec = spec(json!({"game_id": null}));
        let err = resolve(&spec, Some(&bag(json!({"game_id": null})))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_defaults_fill_absent_and_null_values() {
        let spec = spec(json!({"name": null, "isComplete": false}));
        let resolved = resolve(&spec, Some(&bag(json!({"name": "Game 1"})))).unwrap();
        assert_eq!(resolved["name"], json!("Game 1"));
        assert_eq!(resolved["isComplete"], json!(false));

        let resolved =
            resolve(&spec, Some(&bag(json!({"name": "n", "isComplete": null})))).unwrap();
        assert_eq!(resolved["isComplete"], json!(false));
    }

    #[test]
    fn test_caller_values_win_over_defaults() {
        let spec = spec(json!({"isComplete": false}));
        let resolved = resolve(&spec, Some(&bag(json!({"isComplete": true})))).unwrap();
        assert_eq!(resolved["isComplete"], json!(true));
    }

    #[test]
    fn test_empty_spec_accepts_anything() {
        let spec = ParamSpec::new();
        assert!(resolve(&spec, None).unwrap().is_empty());

        let resolved = resolve(&spec, Some(&bag(json!({"extra": 1})))).unwrap();
        assert_eq!(resolved["extra"], json!(1));
    }

    #[test]
    fn test_unspecced_keys_pass_through() {
        let spec = spec(json!({"id": null}));
        let resolved = resolve(&spec, Some(&bag(json!({"id": 7, "extra": "x"})))).unwrap();
        assert_eq!(resolved["extra"], json!("x"));
    }
}
