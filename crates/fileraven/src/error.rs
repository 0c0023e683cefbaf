//! Error types for the ingestion pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Tokenizer, embedding model or vector store failure
    #[error("{service} failed: {message}")]
    ExternalService { service: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an external service failure
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from a collaborator outside the core
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_display() {
        let err = Error::external("tokenizer", "vocab missing");
        assert!(err.is_external());
        assert_eq!(err.to_string(), "tokenizer failed: vocab missing");
    }

    #[test]
    fn test_configuration_is_not_external() {
        let err = Error::configuration("overlap_size must be smaller than chunk_size");
        assert!(!err.is_external());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
