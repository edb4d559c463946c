//! Response built from a handler's output.
//!
//! The body is always the UTF-8 encoding of a text value and the content type
//! is always [`CONTENT_TYPE`].

use bytes::Bytes;

use crate::error::{FuncwireError, Result};

/// Content type of every response produced by this crate.
pub const CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

/// Outcome carried by a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Handler output.
    Ok,
    /// Error message produced under [`ErrorPolicy::RespondWithError`](crate::ErrorPolicy::RespondWithError).
    Error,
}

/// Outbound response for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeResponse {
    data: Bytes,
    status: ResponseStatus,
}

impl InvokeResponse {
    /// Build a response from a handler's return value.
    pub fn from_output(output: String) -> Self {
        Self {
            data: Bytes::from(output),
            status: ResponseStatus::Ok,
        }
    }

    /// Build an error response carrying the error's message.
    pub fn from_error(err: &FuncwireError) -> Self {
        Self {
            data: Bytes::from(err.to_string()),
            status: ResponseStatus::Error,
        }
    }

    /// Response body.
    #[inline]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the response and return its body.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Always [`CONTENT_TYPE`].
    #[inline]
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    #[inline]
    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.data)?)
    }
}
