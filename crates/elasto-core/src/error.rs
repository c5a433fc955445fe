//! Error types for the Elasto client.
//!
//! The taxonomy separates failures the caller can act on:
//!
//! - [`Error::Transport`]: the request never produced a response.
//! - [`Error::Engine`]: the engine answered with a non-success status.
//! - [`Error::Parse`]: the engine answered, but the body is unreadable.
//! - [`Error::Validation`]: caller misuse detected before any request.

/// Errors that can occur while building or executing a query.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Network or connection failure.
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The engine rejected the request.
    #[error("Engine error (HTTP {status}): {message}")]
    Engine {
        /// HTTP status code returned by the engine
        status: u16,
        /// Error message reported by the engine, preserved verbatim
        message: String,
    },

    /// The engine response could not be read.
    #[error("Parse error: {message}")]
    Parse {
        /// What could not be read
        message: String,
        /// Underlying JSON error, if the body was not valid JSON
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Caller-side misuse, rejected before any request is issued.
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error (reading configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type alias for Elasto operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether repeating the same request could succeed.
    ///
    /// Nothing in Elasto retries on its own; this is for callers that want
    /// to implement their own policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::Engine { status, .. } => *status >= 500,
            Error::Parse { .. } => false,
            Error::Validation { .. } => false,
            Error::Config { .. } => false,
            Error::Io(_) => false,
        }
    }

    /// HTTP status reported by the engine, for [`Error::Engine`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Engine { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Creates a new transport error with a message.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new transport error with a message and source error.
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new engine error.
    pub fn engine<S: Into<String>>(status: u16, message: S) -> Self {
        Error::Engine {
            status,
            message: message.into(),
        }
    }

    /// Creates a parse error for a structurally unexpected body.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a parse error from a JSON decoding failure.
    pub fn parse_json<S: Into<String>>(message: S, source: serde_json::Error) -> Self {
        Error::Parse {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
