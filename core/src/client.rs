//! HTTP request builder, response parser and round-trip runner for the book
//! API.
//!
//! # Design
//! Each CRUD operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! the wire contract can be checked without a network. The plain operation
//! methods (`list_books`, `add_book`, ...) join the two through the client's
//! `Transport`.
//!
//! Failure precedence when parsing: HTTP status >= 400 first, then body
//! decoding, then the envelope's `status`. `update` and `delete` look at the
//! HTTP status only.

use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::warn;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{ApiError, Operation};
use crate::http::{prepare_request, HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::transport::{Transport, UreqTransport};
use crate::types::Book;

const COLLECTION_PATH: &str = "/api/v1/books";

/// Client for the book resource.
///
/// Holds the collection URL and a transport; no state is carried between
/// calls, so a clone can be used from another thread.
#[derive(Clone)]
pub struct BookClient<T = UreqTransport> {
    collection_url: String,
    http: HttpClient<T>,
}

impl BookClient<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::default())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(&config.base_url, UreqTransport::new(config.timeout))
    }
}

impl<T> std::fmt::Debug for BookClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookClient")
            .field("collection_url", &self.collection_url)
            .finish_non_exhaustive()
    }
}

impl<T> BookClient<T> {
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{id}", self.collection_url)
    }

    pub fn build_list_books(&self) -> HttpRequest {
        prepare_request(&self.collection_url, RequestOptions::method(HttpMethod::Get))
    }

    pub fn build_get_book(&self, id: &str) -> HttpRequest {
        prepare_request(&self.item_url(id), RequestOptions::method(HttpMethod::Get))
    }

    /// Any id on `book` is dropped; the server assigns one.
    pub fn build_add_book(&self, book: &Book) -> Result<HttpRequest, ApiError> {
        let new_book = Book {
            id: String::new(),
            ..book.clone()
        };
        let body = to_json(&new_book)?;
        Ok(prepare_request(
            &self.collection_url,
            RequestOptions::method(HttpMethod::Post).body(body),
        ))
    }

    pub fn build_update_book(&self, book: &Book) -> Result<HttpRequest, ApiError> {
        if book.id.is_empty() {
            return Err(ApiError::MissingId);
        }
        let body = to_json(book)?;
        Ok(prepare_request(
            &self.item_url(&book.id),
            RequestOptions::method(HttpMethod::Put).body(body),
        ))
    }

    pub fn build_delete_book(&self, id: &str) -> HttpRequest {
        prepare_request(&self.item_url(id), RequestOptions::method(HttpMethod::Delete))
    }

    /// An absent or null `data` field is an empty list.
    pub fn parse_list_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        let books: Option<Vec<Book>> = unwrap_envelope(&response, Operation::List)?;
        Ok(books.unwrap_or_default())
    }

    /// Returns `None` when the server answered success without a payload.
    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Option<Book>, ApiError> {
        unwrap_envelope(&response, Operation::Get)
    }

    pub fn parse_add_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        unwrap_envelope(&response, Operation::Add)?.ok_or_else(|| {
            ApiError::DeserializationError("response envelope carried no book".to_string())
        })
    }

    pub fn parse_update_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Operation::Update)
    }

    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Operation::Delete)
    }
}

impl<T: Transport> BookClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            collection_url: format!("{}{COLLECTION_PATH}", base_url.trim_end_matches('/')),
            http: HttpClient::new(transport),
        }
    }

    pub fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let response = self.http.send(&self.build_list_books())?;
        self.parse_list_books(response)
    }

    pub fn get_book(&self, id: &str) -> Result<Option<Book>, ApiError> {
        let response = self.http.send(&self.build_get_book(id))?;
        self.parse_get_book(response)
    }

    pub fn add_book(&self, book: &Book) -> Result<Book, ApiError> {
        let response = self.http.send(&self.build_add_book(book)?)?;
        self.parse_add_book(response)
    }

    pub fn update_book(&self, book: &Book) -> Result<(), ApiError> {
        let response = self.http.send(&self.build_update_book(book)?)?;
        self.parse_update_book(response)
    }

    pub fn delete_book(&self, id: &str) -> Result<(), ApiError> {
        let response = self.http.send(&self.build_delete_book(id))?;
        self.parse_delete_book(response)
    }
}

fn to_json(book: &Book) -> Result<String, ApiError> {
    serde_json::to_string(book).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Map HTTP status >= 400 to `ApiError::Http`, keeping the envelope's error
/// text when the body has one.
fn check_status(response: &HttpResponse, operation: Operation) -> Result<(), ApiError> {
    if response.is_ok() {
        return Ok(());
    }
    let message = serde_json::from_str::<Envelope<IgnoredAny>>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error_text().map(str::to_string));
    warn!(
        %operation,
        status = response.status,
        error = message.as_deref().unwrap_or_default(),
        "book request failed"
    );
    Err(ApiError::Http {
        operation,
        status: response.status,
        message,
    })
}

fn unwrap_envelope<D: DeserializeOwned>(
    response: &HttpResponse,
    operation: Operation,
) -> Result<Option<D>, ApiError> {
    check_status(response, operation)?;
    let envelope: Envelope<D> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    envelope.into_result(operation).inspect_err(|err| {
        warn!(%operation, status = response.status, error = %err, "book request rejected");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::REQUEST_ID;

    fn client() -> BookClient {
        BookClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_books_produces_correct_request() {
        let req = client().build_list_books();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/v1/books");
        assert!(req.body.is_none());
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert!(req.header(REQUEST_ID).is_some());
    }

    #[test]
    fn build_get_book_produces_correct_request() {
        let req = client().build_get_book("42");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/v1/books/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_add_book_strips_id() {
        let book = Book::new("Dune", "Herbert", 1965).with_id("stale");
        let req = client().build_add_book(&book).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/v1/books");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"title": "Dune", "author": "Herbert", "year": 1965})
        );
    }

    #[test]
    fn build_update_book_puts_to_item_url() {
        let book = Book::new("Dune Messiah", "Herbert", 1969).with_id("42");
        let req = client().build_update_book(&book).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/v1/books/42");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "42");
        assert_eq!(body["title"], "Dune Messiah");
    }

    #[test]
    fn build_update_book_requires_id() {
        let err = client()
            .build_update_book(&Book::new("Dune", "Herbert", 1965))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingId));
    }

    #[test]
    fn build_delete_book_produces_correct_request() {
        let req = client().build_delete_book("42");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/v1/books/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = BookClient::new("http://localhost:3000/");
        assert_eq!(client.collection_url(), "http://localhost:3000/api/v1/books");
    }

    #[test]
    fn parse_list_books_success() {
        let body = r#"{"data":[{"id":"1","title":"Emma","author":"Austen","year":1815}],"status":"success","error":""}"#;
        let books = client().parse_list_books(response(200, body)).unwrap();
        assert_eq!(books, vec![Book::new("Emma", "Austen", 1815).with_id("1")]);
    }

    #[test]
    fn parse_list_books_null_data_is_empty() {
        let books = client()
            .parse_list_books(response(200, r#"{"data":null,"status":"success"}"#))
            .unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn parse_list_books_application_error_despite_200() {
        let err = client()
            .parse_list_books(response(200, r#"{"status":"error","error":"database error"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "database error");
        assert!(matches!(err, ApiError::Application { operation: Operation::List, .. }));
    }

    #[test]
    fn parse_list_books_null_error_is_success() {
        let body = r#"{"data":[],"error":null,"status":"success"}"#;
        let books = client().parse_list_books(response(200, body)).unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn parse_get_book_with_message_and_error() {
        let body = r#"{"data":{"id":"42","title":"Dune","author":"Herbert","year":1965},"error":"","message":"success","status":"success"}"#;
        let book = client().parse_get_book(response(200, body)).unwrap();
        assert_eq!(book, Some(Book::new("Dune", "Herbert", 1965).with_id("42")));
    }

    #[test]
    fn parse_get_book_http_error_keeps_server_text() {
        let err = client()
            .parse_get_book(response(404, r#"{"status":"error","error":"book not found"}"#))
            .unwrap_err();
        assert!(err.is_not_found());
        match err {
            ApiError::Http { operation, message, .. } => {
                assert_eq!(operation, Operation::Get);
                assert_eq!(message.as_deref(), Some("book not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_get_book_absent_data_is_none() {
        let book = client()
            .parse_get_book(response(200, r#"{"status":"success"}"#))
            .unwrap();
        assert!(book.is_none());
    }

    #[test]
    fn parse_add_book_success() {
        let body = r#"{"data":{"id":"42","title":"Dune","author":"Herbert","year":1965},"status":"success","error":""}"#;
        let book = client().parse_add_book(response(201, body)).unwrap();
        assert_eq!(book.id, "42");
    }

    #[test]
    fn parse_add_book_error_status_wins_over_success_body() {
        let err = client()
            .parse_add_book(response(500, r#"{"status":"success"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to add book (HTTP 500)");
    }

    #[test]
    fn parse_add_book_without_data_fails() {
        let err = client()
            .parse_add_book(response(201, r#"{"status":"success"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_update_book_ignores_body() {
        assert!(client().parse_update_book(response(200, "")).is_ok());
        assert!(client()
            .parse_update_book(response(200, r#"{"status":"error"}"#))
            .is_ok());
        let err = client()
            .parse_update_book(response(400, "bad request"))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to update book (HTTP 400)");
    }

    #[test]
    fn parse_delete_book_statuses() {
        assert!(client().parse_delete_book(response(204, "")).is_ok());
        let err = client()
            .parse_delete_book(response(500, r#"{"status":"error","error":"boom"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to delete book (HTTP 500)");
    }

    #[test]
    fn parse_list_books_bad_json() {
        let err = client()
            .parse_list_books(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn operations_run_through_transport() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            assert!(req.request_id().is_some());
            match (req.method, req.path.as_str()) {
                (HttpMethod::Get, "http://books.test/api/v1/books") => Ok(response(
                    200,
                    r#"{"data":[{"id":"7","title":"Emma","author":"Austen","year":1815}],"status":"success"}"#,
                )),
                (HttpMethod::Delete, "http://books.test/api/v1/books/7") => Ok(response(200, "")),
                _ => Ok(response(404, "")),
            }
        };
        let client = BookClient::with_transport("http://books.test", transport);
        assert_eq!(client.list_books().unwrap()[0].id, "7");
        client.delete_book("7").unwrap();
        assert!(client.get_book("8").unwrap_err().is_not_found());
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Err(TransportError("connection refused".into()))
        };
        let client = BookClient::with_transport("http://books.test", transport);
        let err = client.list_books().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
