//! Error types for Taskmesh.

use thiserror::Error;

/// Result type alias using Taskmesh's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Taskmesh.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Registry Errors
    // =========================================================================
    #[error("Invalid registration: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // =========================================================================
    // Discovery / Matching Errors
    // =========================================================================
    #[error("No suitable resource: {0}")]
    NoSuitableResource(String),

    // =========================================================================
    // Dispatch Errors
    // =========================================================================
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unsupported resource class: {0}")]
    UnsupportedResourceClass(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a no-suitable-resource error.
    pub fn no_suitable_resource(msg: impl Into<String>) -> Self {
        Self::NoSuitableResource(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an unsupported-resource-class error.
    pub fn unsupported_class(msg: impl Into<String>) -> Self {
        Self::UnsupportedResourceClass(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable kind name surfaced in result envelopes and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::NotFound(_) => "NotFoundError",
            Self::NoSuitableResource(_) => "NoSuitableResource",
            Self::Connection(_) => "ConnectionError",
            Self::Timeout(_) => "TimeoutError",
            Self::UnsupportedResourceClass(_) => "UnsupportedResourceClass",
            Self::Serialization(_) => "SerializationError",
            Self::Internal(_) => "InternalError",
            Self::Other(_) => "InternalError",
        }
    }
}
