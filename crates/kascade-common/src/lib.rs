//! Common plumbing for the kascade implementation of the Khan Academy
//! internal content API.

#![warn(missing_docs)]

pub mod dictpath;
pub mod endpoint;
pub mod error;
/// HTTP client abstraction used by kascade crates.
pub mod http_client;

pub use error::{ApiResult, ClientError, FieldError};
