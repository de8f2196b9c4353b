use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// Body of POST and PUT requests. Missing fields default so validation can
/// report which one is empty.
#[derive(Debug, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: i32,
}

impl BookInput {
    fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title cannot be empty");
        }
        if self.author.trim().is_empty() {
            return Err("author cannot be empty");
        }
        if self.year == 0 {
            return Err("year cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: String,
    pub status: String,
}

type Reply<T> = (StatusCode, Json<Envelope<T>>);

fn success<T>(code: StatusCode, data: Option<T>) -> Reply<T> {
    let envelope = Envelope {
        data,
        error: String::new(),
        status: "success".to_string(),
    };
    (code, Json(envelope))
}

fn failure<T>(code: StatusCode, error: &str) -> Reply<T> {
    let envelope = Envelope {
        data: None,
        error: error.to_string(),
        status: "error".to_string(),
    };
    (code, Json(envelope))
}

/// Books in insertion order.
pub type Db = Arc<RwLock<Vec<Book>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let books = Router::new()
        .route("/books", get(list_books).post(add_book))
        .route("/books/{id}", get(get_book).put(update_book).delete(delete_book));

    Router::new()
        .nest("/api/v1", books)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_books(State(db): State<Db>) -> Reply<Vec<Book>> {
    let books = db.read().await;
    success(StatusCode::OK, Some(books.clone()))
}

async fn add_book(
    State(db): State<Db>,
    input: Result<Json<BookInput>, JsonRejection>,
) -> Reply<Book> {
    let Ok(Json(input)) = input else {
        return failure(StatusCode::BAD_REQUEST, "Cannot parse JSON");
    };
    if let Err(msg) = input.validate() {
        return failure(StatusCode::BAD_REQUEST, msg);
    }
    let book = Book {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        author: input.author,
        year: input.year,
    };
    db.write().await.push(book.clone());
    tracing::info!(id = %book.id, "book added");
    success(StatusCode::CREATED, Some(book))
}

async fn get_book(State(db): State<Db>, Path(id): Path<String>) -> Reply<Book> {
    let books = db.read().await;
    match books.iter().find(|b| b.id == id) {
        Some(book) => success(StatusCode::OK, Some(book.clone())),
        None => failure(StatusCode::NOT_FOUND, "book not found"),
    }
}

async fn update_book(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<BookInput>, JsonRejection>,
) -> Reply<Book> {
    let Ok(Json(input)) = input else {
        return failure(StatusCode::BAD_REQUEST, "Cannot parse JSON");
    };
    if let Err(msg) = input.validate() {
        return failure(StatusCode::BAD_REQUEST, msg);
    }
    let mut books = db.write().await;
    let Some(book) = books.iter_mut().find(|b| b.id == id) else {
        return failure(StatusCode::NOT_FOUND, "book not found");
    };
    book.title = input.title;
    book.author = input.author;
    book.year = input.year;
    tracing::info!(%id, "book updated");
    success(StatusCode::OK, None)
}

async fn delete_book(State(db): State<Db>, Path(id): Path<String>) -> Reply<Book> {
    let mut books = db.write().await;
    let Some(pos) = books.iter().position(|b| b.id == id) else {
        return failure(StatusCode::NOT_FOUND, "book not found");
    };
    books.remove(pos);
    tracing::info!(%id, "book deleted");
    success(StatusCode::OK, None)
}
