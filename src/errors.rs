//! Error types for aromabot
//!
//! One taxonomy shared by the indexer and the query engine. Every variant
//! maps to a stable, user-facing category so the REPL can report failures
//! without leaking implementation detail.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for indexing and question answering
#[derive(Error, Debug)]
pub enum RagError {
    /// Missing or invalid local configuration (including the API credential)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source file does not exist
    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// No usable prebuilt index at the given location
    #[error("Index not found at {}: {reason}", location.display())]
    IndexNotFound { location: PathBuf, reason: String },

    /// Nothing to index
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    /// Provider rejected the credential
    #[error("Authentication failed ({provider}): {message}")]
    Authentication { provider: String, message: String },

    /// Network, quota, timeout or malformed-response failure at the provider
    #[error("Service error ({provider}): {message}")]
    Service { provider: String, message: String },

    /// Caller passed a value the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Query engine state machine violation
    #[error("Invalid state transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything unclassified, surfaced only at the top-level boundary
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for aromabot operations
pub type Result<T> = std::result::Result<T, RagError>;

impl RagError {
    /// Stable category name shown to users
    pub fn category(&self) -> &'static str {
        match self {
            RagError::Configuration(_) => "ConfigurationError",
            RagError::NotFound { .. } => "NotFoundError",
            RagError::IndexNotFound { .. } => "IndexNotFoundError",
            RagError::EmptyCorpus(_) => "EmptyCorpusError",
            RagError::Authentication { .. } => "AuthenticationError",
            RagError::Service { .. } => "ServiceError",
            RagError::InvalidArgument(_) => "InvalidArgumentError",
            RagError::Io(_) => "IoError",
            RagError::Serialization(_) => "SerializationError",
            RagError::InvalidTransition { .. } | RagError::Internal(_) => "InternalError",
        }
    }

    /// Short remediation hint, when one exists
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RagError::Configuration(_) => {
                Some("Set OPENAI_API_KEY in your environment or .env file.")
            }
            RagError::IndexNotFound { .. } => Some("Run `aromabot build` first."),
            RagError::NotFound { .. } => Some("Check the source path in your configuration."),
            RagError::Authentication { .. } => Some("Check that your API key is valid."),
            _ => None,
        }
    }

    /// Build a service error for a provider
    pub fn service(provider: &str, message: impl Into<String>) -> Self {
        RagError::Service {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Build an authentication error for a provider
    pub fn authentication(provider: &str, message: impl Into<String>) -> Self {
        RagError::Authentication {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Build an index-not-found error
    pub fn index_not_found(location: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RagError::IndexNotFound {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Convert anyhow errors at the binary boundary
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RagError>() {
            Ok(rag) => rag,
            Err(other) => RagError::Internal(other.to_string()),
        }
    }
}
