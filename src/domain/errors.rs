//! Domain error types
//!
//! This module defines the error hierarchy for the uploader.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the application.
/// It wraps registry errors and provides context for error handling.
#[derive(Debug, Error)]
pub enum IysError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Structural problems with the input table (missing columns, bad timestamps)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Consent registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl IysError {
    /// Whether this error ends the whole run rather than the current batch
    ///
    /// Every batch depends on the same bearer token, so an authentication
    /// failure is fatal for the run. Registry errors of any other kind only
    /// affect the batch that raised them.
    pub fn is_run_fatal(&self) -> bool {
        match self {
            IysError::Registry(registry) => registry.is_run_fatal(),
            _ => true,
        }
    }
}

/// Consent registry errors
///
/// Errors that occur when talking to the registry.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to reach the registry
    #[error("Failed to connect to registry: {0}")]
    ConnectionFailed(String),

    /// Token exchange failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-2xx response on submit or status
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// A 2xx response whose body does not have the expected shape
    #[error("Unexpected response from registry: {0}")]
    UnexpectedResponse(String),

    /// Polling budget exhausted while sub-requests were still in progress
    #[error("Request {request_id} still in progress after {attempts} status checks")]
    PollTimeout { request_id: String, attempts: u32 },
}

impl RegistryError {
    /// Whether this error aborts the whole run
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, RegistryError::AuthenticationFailed(_))
    }

    /// Raw registry body, when the registry sent one
    pub fn registry_body(&self) -> Option<&str> {
        match self {
            RegistryError::Api { body, .. } if !body.is_empty() => Some(body.as_str()),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for IysError {
    fn from(err: std::io::Error) -> Self {
        IysError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for IysError {
    fn from(err: serde_json::Error) -> Self {
        IysError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for IysError {
    fn from(err: toml::de::Error) -> Self {
        IysError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for IysError {
    fn from(err: csv::Error) -> Self {
        IysError::Validation(format!("Malformed CSV input: {err}"))
    }
}
