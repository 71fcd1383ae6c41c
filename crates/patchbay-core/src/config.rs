//! Process-wide configuration.
//!
//! One configuration object describes both sides of the system: transport
//! settings for the serving side, client settings for the calling side, and
//! the shared route mapping both sides derive their bindings from. The
//! object is loaded once, explicitly, and never mutated afterwards.

use crate::error::{PatchbayError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Default topic prefix applied to rendered pub/sub topics.
const DEFAULT_TOPIC_PREFIX: &str = "/";

/// Top-level configuration.
///
/// The route mapping stays as raw JSON here; [`crate::routes::parse_routes`]
/// turns it into typed descriptors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Serving-side transport settings.
    #[serde(default)]
    pub server: ServerSection,
    /// Calling-side transport settings.
    #[serde(default)]
    pub client: ClientSection,
    /// Route name -> route configuration.
    #[serde(default)]
    pub routes: Map<String, Value>,
}

/// Serving-side settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    /// Port for the HTTP surface (0 = auto-assign).
    #[serde(default)]
    pub port: u16,
    /// Names of callables the function routes expect to find registered.
    #[serde(default)]
    pub functions: Vec<String>,
    /// Data-store settings, required only when query routes exist.
    #[serde(default)]
    pub database: Option<DatabaseSection>,
    /// Broker settings, required only when pub/sub routes exist.
    #[serde(default)]
    pub websockets: Option<BrokerSection>,
}

/// Data-store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    /// Backend kind. Only `sqlite` is currently supported.
    #[serde(rename = "type")]
    pub kind: String,
    /// Default table for query routes that don't name their own.
    #[serde(default)]
    pub table: Option<String>,
    /// Database file path. Defaults to `sqlite3.db` when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Broker connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSection {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub endpoint: String,
    /// Prepended literally to every rendered topic.
    #[serde(rename = "topicPrefix", default = "default_topic_prefix")]
    pub topic_prefix: String,
}

fn default_topic_prefix() -> String {
    DEFAULT_TOPIC_PREFIX.to_string()
}

impl BrokerSection {
    /// Assemble the broker URL a network-backed broker implementation dials.
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol, self.host, self.port, self.endpoint
        )
    }
}

/// Calling-side settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSection {
    /// HTTP client settings for function/query route proxies.
    #[serde(default)]
    pub http: Option<HttpSection>,
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSection {
    #[serde(rename = "baseURL")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(rename = "timeoutSecs", default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Parse a configuration from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PatchbayError::Config {
            message: format!("Invalid configuration: {}", e),
        })
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PatchbayError::Config {
            message: format!("Invalid configuration: {}", e),
        })
    }

    /// Load a configuration from a JSON file at an explicit path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PatchbayError::Io {
            message: format!("Failed to read config {}: {}", path.display(), e),
            source: Some(e),
        })?;
        Self::from_json_str(&raw)
    }

    /// Topic prefix for pub/sub routes, `/` when no broker section is set.
    pub fn topic_prefix(&self) -> &str {
        self.server
            .websockets
            .as_ref()
            .map(|ws| ws.topic_prefix.as_str())
            .unwrap_or(DEFAULT_TOPIC_PREFIX)
    }

    /// Default table for query routes.
    pub fn default_table(&self) -> Option<&str> {
        self.server
            .database
            .as_ref()
            .and_then(|db| db.table.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_config() -> Config {
        Config::from_value(json!({
            "server": {
                "port": 4200,
                "functions": ["gameComplete"],
                "websockets": {
                    "protocol": "wss",
                    "host": "broker.example.io",
                    "port": 8084,
                    "endpoint": "/mqtt"
                },
                "database": { "type": "sqlite", "table": "games" }
            },
            "client": {
                "http": { "baseURL": "http://localhost:4200" }
            },
            "routes": {
                "subGame": { "type": "websockets/sub", "topic": "games/{game_id}" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = full_config();
        assert_eq!(config.server.port, 4200);
        assert_eq!(config.server.functions, vec!["gameComplete"]);
        assert_eq!(config.default_table(), Some("games"));
        assert_eq!(
            config.client.http.as_ref().unwrap().base_url,
            "http://localhost:4200"
        );
        assert!(config.routes.contains_key("subGame"));
    }

    #[test]
    fn test_topic_prefix_defaults_to_slash() {
        let config = full_config();
        assert_eq!(config.topic_prefix(), "/");

        let config = Config::from_value(json!({})).unwrap();
        assert_eq!(config.topic_prefix(), "/");
    }

    #[test]
    fn test_broker_url_assembly() {
        let config = full_config();
        let ws = config.server.websockets.as_ref().unwrap();
        assert_eq!(ws.url(), "wss://broker.example.io:8084/mqtt");
    }

    #[test]
    fn test_invalid_config_is_a_config_error() {
        let err = Config::from_value(json!({"server": {"port": "not-a-port"}})).unwrap_err();
        assert!(matches!(err, PatchbayError::Config { .. }));
    }
}
