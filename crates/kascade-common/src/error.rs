//! Error types for content API client operations.
//!
//! Nothing here is ever caught and suppressed inside the library; every error
//! bubbles to the caller, and no retries happen internally.

use bytes::Bytes;

use crate::dictpath::PathError;

/// Client error type wrapping all possible error conditions
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// HTTP error response
    #[error("HTTP {0}")]
    Http(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),

    /// Request serialization failed
    #[error("{0}")]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// Response deserialization failed
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// A declared path-map field could not be handled
    #[error("{0}")]
    Field(
        #[from]
        #[diagnostic_source]
        FieldError,
    ),

    /// A dict path failed to resolve outside of path-map field access
    #[error("{0}")]
    Path(
        #[from]
        #[diagnostic_source]
        PathError,
    ),

    /// A declared-but-unimplemented capability was invoked.
    ///
    /// These operations are placeholders by design; they always fail rather
    /// than silently doing nothing.
    #[error("capability `{capability}` is declared but not implemented")]
    Unimplemented {
        /// Name of the stub operation that was called.
        capability: &'static str,
    },

    /// An id did not match any entry in the feed that was scanned for it.
    ///
    /// Distinct from [`ClientError::Http`]: the requests themselves succeeded,
    /// the feed just never contained the id.
    #[error("`{id}` does not identify an entry in the scanned feed")]
    Identifier {
        /// The id that was being looked for.
        id: String,
    },
}

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other transport error
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// HTTP error response (any non-2xx status code)
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct HttpError {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body if available
    pub body: Option<Bytes>,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(body) = &self.body {
            if let Ok(s) = std::str::from_utf8(body) {
                write!(f, ":\n{}", s)?;
            }
        }
        Ok(())
    }
}

/// Request serialization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// Failed to serialize query parameters
    #[error("Failed to serialize query: {0}")]
    Query(
        #[from]
        #[source]
        serde_html_form::ser::Error,
    ),
    /// Failed to serialize JSON body
    #[error("Failed to serialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// Response deserialization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// JSON deserialization failed
    #[error("Failed to deserialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// Path-map field errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum FieldError {
    /// The field name is not declared in the type's path map
    #[error("`{field}` is not a declared metadata field")]
    Unknown {
        /// The undeclared field name.
        field: String,
    },
    /// The field's declared path did not resolve against fetched metadata
    #[error("field `{field}` did not resolve: {source}")]
    Unresolved {
        /// The declared field name.
        field: String,
        /// The path failure underneath.
        #[source]
        source: PathError,
    },
}

/// Result type for client operations
pub type ApiResult<T> = std::result::Result<T, ClientError>;

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}
