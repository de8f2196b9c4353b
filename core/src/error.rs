//! Error types for the book API client.
//!
//! # Design
//! Three failure layers are kept apart: the transport could not complete the
//! exchange (`Transport`), the server answered with HTTP status >= 400
//! (`Http`), or the server answered 2xx but its envelope reported a failure
//! (`Application`). The remaining variants are local encode/decode problems.

use std::fmt;

use thiserror::Error;

/// The book operation a failure belongs to. Its `Display` form completes the
/// generic "failed to ..." message for HTTP-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Add,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::List => "fetch books",
            Operation::Get => "fetch book",
            Operation::Add => "add book",
            Operation::Update => "update book",
            Operation::Delete => "delete book",
        };
        f.write_str(verb)
    }
}

/// The request could not be carried out at all: connect, DNS, TLS, timeout.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Errors returned by `BookClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// HTTP status >= 400. `message` holds the envelope's error text when
    /// the body could be decoded.
    #[error("failed to {operation} (HTTP {status})")]
    Http {
        operation: Operation,
        status: u16,
        message: Option<String>,
    },

    /// The envelope's status was not `"success"`.
    #[error("{message}")]
    Application { operation: Operation, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// An update was attempted on a book that has no id.
    #[error("book id is required")]
    MissingId,
}

impl ApiError {
    /// True when the server reported that the book does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }

    /// The operation this error belongs to, if it came from the server.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ApiError::Http { operation, .. } | ApiError::Application { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }
}

/// Form input rejected before it reaches the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("author cannot be empty")]
    EmptyAuthor,
    #[error("year cannot be empty")]
    MissingYear,
    #[error("year {0} is out of range")]
    YearOutOfRange(i32),
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}
