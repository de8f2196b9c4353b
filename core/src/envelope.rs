//! The JSON envelope wrapping every API response.
//!
//! `{ "data": <payload>, "error": <string>, "status": <string> }`. The
//! `status` field is authoritative: anything other than `"success"` is a
//! failure, whatever the HTTP status said. `error` may be null. Older servers
//! sent the error text under `message`; both fields are read and `error` wins
//! when it is non-empty.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Operation};

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope<T> {
    #[serde(default = "none")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: String,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The server's error text: `error` if non-empty, otherwise `message`.
    pub fn error_text(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
    }

    /// Unwrap the payload, turning a non-success status into
    /// `ApiError::Application` with the server's text.
    pub fn into_result(self, operation: Operation) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            return Ok(self.data);
        }
        let message = match self.error_text() {
            Some(text) => text.to_string(),
            None => format!("server reported status {:?}", self.status),
        };
        Err(ApiError::Application { operation, message })
    }
}
