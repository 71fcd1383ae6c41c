//! HTTP transport collaborator.
//!
//! The proxy delegates function and query invocations to this seam after
//! local validation; the default implementation posts JSON with reqwest.

use async_trait::async_trait;
use patchbay::{HttpSection, PatchbayError, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper to create a transport error.
fn net_err(msg: String) -> PatchbayError {
    PatchbayError::Transport { message: msg }
}

/// Request/response transport consumed by the client proxy.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body to a path under the configured base URL and
    /// return the JSON response.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
}

/// reqwest-backed transport.
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport from the client HTTP settings.
    pub fn new(config: &HttpSection) -> Self {
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(REQUEST_TIMEOUT);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("patchbay")
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| net_err(format!("Failed to reach {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            // Server failures carry {message} or {error}; surface that text.
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("Server returned {}", status));
            return Err(PatchbayError::execution(message));
        }

        response
            .json()
            .await
            .map_err(|e| net_err(format!("Failed to parse response from {}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let transport = ReqwestTransport::new(&HttpSection {
            base_url: "http://localhost:4200/".to_string(),
            timeout_secs: None,
        });
        assert_eq!(transport.base_url, "http://localhost:4200");
    }
}
