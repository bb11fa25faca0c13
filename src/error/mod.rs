//! # Error Handling Module
//!
//! Error types for the hashsmith server. Every request-level failure is
//! handled locally at the handler boundary and translated into an HTTP status
//! code plus a short plain-text body; none of them are fatal to the process.
//!
//! ## Error Categories
//!
//! - **Request Errors**: invalid input, unknown identifiers, wrong HTTP verbs
//! - **Serialization Errors**: stats encoding failures, surfaced as plain text
//! - **Server Errors**: listener and connection faults
//! - **Configuration Errors**: invalid startup configuration

use thiserror::Error;

/// Result type alias for the hashsmith crate
///
/// Convenient shorthand for `Result<T, HashsmithError>` used throughout the
/// codebase for consistent error handling.
pub type Result<T> = std::result::Result<T, HashsmithError>;

/// All error conditions the server can encounter
///
/// Request-scoped variants carry enough context for internal logging; the
/// body sent to the client comes from [`HashsmithError::client_message`] and
/// never exposes internal detail.
#[derive(Error, Debug)]
pub enum HashsmithError {
    /// The submitted secret was empty or missing
    ///
    /// Rejected before an identifier is allocated or a timing sample is
    /// recorded. Surfaced to the client as a 400 response.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Internal error message for logging
        message: String,
    },

    /// No servable record for the requested identifier
    ///
    /// Covers non-numeric identifiers, identifiers that were never issued,
    /// and identifiers whose digest has not been computed yet. The retrieval
    /// protocol deliberately does not distinguish these cases.
    #[error("not found: {message}")]
    NotFound {
        /// Internal error message for logging
        message: String,
    },

    /// The endpoint exists but does not accept the request method
    #[error("method not allowed: {message}")]
    MethodNotAllowed {
        /// Internal error message for logging
        message: String,
    },

    /// Encoding a response body failed
    ///
    /// Surfaced to the client as a plain-text diagnostic rather than JSON.
    #[error("serialization failed: {message}")]
    Serialization {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTTP server operation failed
    ///
    /// Covers listener bind failures, accept errors, and response
    /// construction faults.
    #[error("server error: {message}")]
    Server {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Server configuration is invalid
    ///
    /// These should only occur at startup.
    #[error("configuration error: {message}")]
    Config {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HashsmithError {
    /// Create a new invalid-input error
    #[inline]
    pub fn invalid_input<T>(message: T) -> Self
    where
        T: Into<String>,
    {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    #[inline]
    pub fn not_found<T>(message: T) -> Self
    where
        T: Into<String>,
    {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new method-not-allowed error
    #[inline]
    pub fn method_not_allowed<M, P>(method: M, path: P) -> Self
    where
        M: std::fmt::Display,
        P: std::fmt::Display,
    {
        Self::MethodNotAllowed {
            message: format!("{method} on {path}"),
        }
    }

    /// Create a new serialization error with message and optional source
    #[inline]
    pub fn serialization<T>(
        message: T,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self
    where
        T: Into<String>,
    {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a new server error with message and optional source
    #[inline]
    pub fn server<T>(message: T, source: Option<Box<dyn std::error::Error + Send + Sync>>) -> Self
    where
        T: Into<String>,
    {
        Self::Server {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error with message and optional source
    #[inline]
    pub fn config<T>(message: T, source: Option<Box<dyn std::error::Error + Send + Sync>>) -> Self
    where
        T: Into<String>,
    {
        Self::Config {
            message: message.into(),
            source,
        }
    }

    /// Get the HTTP status code for this error
    #[inline]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Serialization { .. } | Self::Server { .. } | Self::Config { .. } => 500,
        }
    }

    /// Get the response body sent to the client for this error
    ///
    /// Bodies are short fixed strings; internal messages stay in the logs.
    #[inline]
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "Invalid password entry.",
            Self::NotFound { .. } => "Not found",
            Self::MethodNotAllowed { .. } => "Method not allowed",
            Self::Serialization { .. } => "Response serialization failed",
            Self::Server { .. } | Self::Config { .. } => "Internal server error",
        }
    }

    /// Get the internal error message for logging
    #[inline]
    pub fn internal_message(&self) -> &str {
        match self {
            Self::InvalidInput { message }
            | Self::NotFound { message }
            | Self::MethodNotAllowed { message }
            | Self::Serialization { message, .. }
            | Self::Server { message, .. }
            | Self::Config { message, .. } => message,
        }
    }

    /// Check if this error should be logged at ERROR level
    ///
    /// Rejected requests are routine and logged at WARN; everything else
    /// indicates a server-side fault.
    #[inline]
    pub fn is_critical(&self) -> bool {
        match self {
            Self::InvalidInput { .. } | Self::NotFound { .. } | Self::MethodNotAllowed { .. } => {
                false
            }
            Self::Serialization { .. } | Self::Server { .. } | Self::Config { .. } => true,
        }
    }
}

impl From<std::io::Error> for HashsmithError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::server(format!("I/O error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_json::Error> for HashsmithError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON encoding error: {err}"), Some(Box::new(err)))
    }
}

impl From<hyper::Error> for HashsmithError {
    #[inline]
    fn from(err: hyper::Error) -> Self {
        Self::server(format!("Hyper error: {err}"), Some(Box::new(err)))
    }
}

impl From<hyper::http::Error> for HashsmithError {
    #[inline]
    fn from(err: hyper::http::Error) -> Self {
        Self::server(format!("HTTP error: {err}"), Some(Box::new(err)))
    }
}
