//! Synchronous API client core for the book catalog service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values as plain
//! data, and runs the round-trip through a pluggable `Transport` (ureq by
//! default). Every response is wrapped in an `Envelope` whose `status` field
//! decides success.
//!
//! # Design
//! - `BookClient` holds only the collection URL and a transport.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response); `list_books`, `get_book`, `add_book`,
//!   `update_book` and `delete_book` join the two.
//! - Every request carries a fresh `X-Request-ID`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::BookClient;
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ConfigError, Operation, TransportError, ValidationError};
pub use http::{prepare_request, HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use transport::{Transport, UreqTransport};
pub use types::Book;
