//! HTTP transport types and the request wrapper.
//!
//! # Design
//! Requests and responses are plain data. `prepare_request` applies the
//! defaults every call shares (method `GET`, JSON content type, a fresh
//! `X-Request-ID`), and `HttpClient` hands the result to a `Transport`.
//! Neither layer interprets status codes or bodies: a 500 comes back as an
//! `HttpResponse` like any other, and only transport failures are errors.

use tracing::debug;
use uuid::Uuid;

use crate::error::TransportError;
use crate::transport::Transport;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const REQUEST_ID: &str = "X-Request-ID";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Status below 400.
    pub fn is_ok(&self) -> bool {
        self.status < 400
    }
}

/// Caller-supplied overrides for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn method(method: HttpMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Build a request for `url` with a freshly generated correlation id.
pub fn prepare_request(url: &str, options: RequestOptions) -> HttpRequest {
    prepare_request_with_id(url, options, Uuid::new_v4())
}

/// Merge order: defaults, then caller headers (replacing defaults of the same
/// name), then `X-Request-ID`, which callers cannot override.
pub(crate) fn prepare_request_with_id(
    url: &str,
    options: RequestOptions,
    request_id: Uuid,
) -> HttpRequest {
    let mut headers = vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())];
    for (name, value) in options.headers {
        if name.eq_ignore_ascii_case(REQUEST_ID) {
            continue;
        }
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }
    headers.push((REQUEST_ID.to_string(), request_id.to_string()));

    HttpRequest {
        method: options.method.unwrap_or(HttpMethod::Get),
        path: url.to_string(),
        headers,
        body: options.body,
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Issues requests through a `Transport`, adding the shared defaults.
#[derive(Debug, Clone)]
pub struct HttpClient<T> {
    transport: T,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Prepare and send one request. Non-2xx statuses are returned as data.
    pub fn fetch(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, TransportError> {
        let request = prepare_request(url, options);
        self.send(&request)
    }

    /// Send an already prepared request.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(
            method = request.method.as_str(),
            url = %request.path,
            request_id = request.request_id().unwrap_or_default(),
            "sending request"
        );
        let response = self.transport.execute(request)?;
        debug!(status = response.status, url = %request.path, "received response");
        Ok(response)
    }
}
