//! Route descriptor registry.
//!
//! Parses the raw route mapping from the configuration into typed
//! descriptors, one per route, tagged by kind. Parsing is strict: an
//! unknown kind or a malformed route fails the whole parse rather than
//! being silently skipped, so a typo in the configuration surfaces at
//! startup instead of as a missing endpoint.

use crate::error::{PatchbayError, Result};
use crate::params::ParamSpec;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Route kind tag for function routes.
pub const KIND_FUNCTION: &str = "javascript/function";
/// Route kind tag for query routes.
pub const KIND_QUERY: &str = "db/postgres";
/// Route kind tag for subscribe routes.
pub const KIND_SUB: &str = "websockets/sub";
/// Route kind tag for publish routes.
pub const KIND_PUB: &str = "websockets/pub";

/// Statement shape of a query route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMethod {
    /// Full-table select, filtered by the ParamSpec columns when present.
    Select,
    /// Parametrized insert over exactly the ParamSpec columns.
    Insert,
    /// Literal statement template with `{table}` substitution.
    Query,
}

impl QueryMethod {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "select" => Some(QueryMethod::Select),
            "insert" => Some(QueryMethod::Insert),
            "query" => Some(QueryMethod::Query),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMethod::Select => "select",
            QueryMethod::Insert => "insert",
            QueryMethod::Query => "query",
        }
    }
}

/// A remote-function route.
#[derive(Debug, Clone)]
pub struct FunctionRoute {
    pub name: String,
    /// Name of the registered callable. Defaults to the route name.
    pub function: String,
    pub params: ParamSpec,
}

/// A parametrized data-query route.
#[derive(Debug, Clone)]
pub struct QueryRoute {
    pub name: String,
    pub method: QueryMethod,
    /// Literal statement template, present iff `method` is `query`.
    pub query: Option<String>,
    /// Table override; falls back to the database section's table.
    pub table: Option<String>,
    pub params: ParamSpec,
}

/// A templated subscribe route.
#[derive(Debug, Clone)]
pub struct SubRoute {
    pub name: String,
    pub topic: String,
}

/// A templated publish route.
#[derive(Debug, Clone)]
pub struct PubRoute {
    pub name: String,
    pub topic: String,
    /// Whether the dispatcher also exposes this route over HTTP.
    pub http: bool,
}

/// Parsed, typed representation of one route's configuration.
///
/// Kind is resolved once here; everything downstream dispatches by
/// exhaustive match, so adding a kind is a compile-time decision.
#[derive(Debug, Clone)]
pub enum RouteDescriptor {
    Function(FunctionRoute),
    Query(QueryRoute),
    Sub(SubRoute),
    Pub(PubRoute),
}

impl RouteDescriptor {
    /// The route's unique name, the key in the configuration mapping.
    pub fn name(&self) -> &str {
        match self {
            RouteDescriptor::Function(r) => &r.name,
            RouteDescriptor::Query(r) => &r.name,
            RouteDescriptor::Sub(r) => &r.name,
            RouteDescriptor::Pub(r) => &r.name,
        }
    }
}

// Raw per-kind shapes, deserialized after the kind tag is resolved.

#[derive(Deserialize)]
struct RawFunctionRoute {
    #[serde(default)]
    function: Option<String>,
    #[serde(default)]
    params: ParamSpec,
}

#[derive(Deserialize)]
struct RawQueryRoute {
    method: String,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    params: ParamSpec,
}

#[derive(Deserialize)]
struct RawTopicRoute {
    topic: String,
    #[serde(default)]
    http: bool,
}

/// Parse the route mapping into descriptors, one per entry, in
/// configuration order.
pub fn parse_routes(routes: &Map<String, Value>) -> Result<Vec<RouteDescriptor>> {
    routes
        .iter()
        .map(|(name, config)| parse_route(name, config))
        .collect()
}

fn parse_route(name: &str, config: &Value) -> Result<RouteDescriptor> {
    let kind = config
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchbayError::Config {
            message: format!("Route '{}' has no 'type' field", name),
        })?;

    match kind {
        KIND_FUNCTION => {
            let raw: RawFunctionRoute = deserialize_route(name, config)?;
            Ok(RouteDescriptor::Function(FunctionRoute {
                name: name.to_string(),
                function: raw.function.unwrap_or_else(|| name.to_string()),
                params: raw.params,
            }))
        }
        KIND_QUERY => {
            let raw: RawQueryRoute = deserialize_route(name, config)?;
            let method = QueryMethod::from_str(&raw.method).ok_or_else(|| {
                PatchbayError::UnsupportedQueryMethod {
                    method: raw.method.clone(),
                }
            })?;
            if method == QueryMethod::Query && raw.query.is_none() {
                return Err(PatchbayError::Config {
                    message: format!("Route '{}': 'query' is required when method = query", name),
                });
            }
            if method == QueryMethod::Insert && raw.params.is_empty() {
                return Err(PatchbayError::Config {
                    message: format!("Route '{}': 'params' is required when method = insert", name),
                });
            }
            Ok(RouteDescriptor::Query(QueryRoute {
                name: name.to_string(),
                method,
                query: raw.query,
                table: raw.table,
                params: raw.params,
            }))
        }
        KIND_SUB => {
            let raw: RawTopicRoute = deserialize_route(name, config)?;
            Ok(RouteDescriptor::Sub(SubRoute {
                name: name.to_string(),
                topic: raw.topic,
            }))
        }
        KIND_PUB => {
            let raw: RawTopicRoute = deserialize_route(name, config)?;
            Ok(RouteDescriptor::Pub(PubRoute {
                name: name.to_string(),
                topic: raw.topic,
                http: raw.http,
            }))
        }
        other => Err(PatchbayError::UnsupportedRouteKind {
            kind: other.to_string(),
        }),
    }
}

fn deserialize_route<T: serde::de::DeserializeOwned>(name: &str, config: &Value) -> Result<T> {
    serde_json::from_value(config.clone()).map_err(|e| PatchbayError::Config {
        message: format!("Route '{}' is malformed: {}", name, e),
    })
}
