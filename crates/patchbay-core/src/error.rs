//! Error types for the Patchbay engine.
//!
//! One taxonomy covers both sides of a route: validation failures that are
//! detected before any transport action, and transport/execution failures
//! surfaced by collaborators.

use thiserror::Error;

/// Main error type for Patchbay operations.
#[derive(Debug, Error)]
pub enum PatchbayError {
    // Validation errors (detected before any transport action)
    #[error("Parameter '{name}' is required")]
    MissingRequiredParameter { name: String },

    #[error("Argument '{name}' not provided")]
    UnresolvedPlaceholder { name: String },

    // Route configuration errors
    #[error("Unsupported route kind: {kind}")]
    UnsupportedRouteKind { kind: String },

    #[error("Unsupported query method: {method}")]
    UnsupportedQueryMethod { method: String },

    #[error("Unsupported backend: {backend}")]
    UnsupportedBackend { backend: String },

    #[error("Unknown route: {name}")]
    UnknownRoute { name: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // Transport and execution errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Execution error: {message}")]
    Execution { message: String },

    // Infrastructure errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for Patchbay operations.
pub type Result<T> = std::result::Result<T, PatchbayError>;

impl From<std::io::Error> for PatchbayError {
    fn from(err: std::io::Error) -> Self {
        PatchbayError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for PatchbayError {
    fn from(err: serde_json::Error) -> Self {
        PatchbayError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for PatchbayError {
    fn from(err: rusqlite::Error) -> Self {
        PatchbayError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl PatchbayError {
    /// Create a transport error from any displayable cause.
    pub fn transport(message: impl Into<String>) -> Self {
        PatchbayError::Transport {
            message: message.into(),
        }
    }

    /// Create an execution error from any displayable cause.
    pub fn execution(message: impl Into<String>) -> Self {
        PatchbayError::Execution {
            message: message.into(),
        }
    }

    /// Whether this error was produced by argument validation.
    ///
    /// Validation errors short-circuit before any transport call, on both
    /// the serving and the calling side.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PatchbayError::MissingRequiredParameter { .. }
                | PatchbayError::UnresolvedPlaceholder { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatchbayError::MissingRequiredParameter {
            name: "game_id".into(),
        };
        assert_eq!(err.to_string(), "Parameter 'game_id' is required");

        let err = PatchbayError::UnsupportedRouteKind {
            kind: "grpc/stream".into(),
        };
        assert_eq!(err.to_string(), "Unsupported route kind: grpc/stream");
    }

    #[test]
    fn test_validation_classification() {
        assert!(PatchbayError::MissingRequiredParameter {
            name: "id".into()
        }
        .is_validation());
        assert!(PatchbayError::UnresolvedPlaceholder {
            name: "game_id".into()
        }
        .is_validation());
        assert!(!PatchbayError::transport("connection refused").is_validation());
    }
}
