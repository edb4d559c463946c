//! Request adapter.
//!
//! Wraps a raw inbound invocation (metadata + body bytes) behind a read-only
//! accessor contract. The body is decoded as UTF-8 on first access to
//! [`InvokeRequest::text`] and the outcome is cached for the lifetime of the
//! request.
//!
//! # Example
//!
//! ```
//! use funcwire::InvokeRequest;
//!
//! let request = InvokeRequest::new([("lang", "en")], "hello");
//! assert_eq!(request.metadata_value("lang"), Some("en"));
//! assert_eq!(request.text().unwrap(), "hello");
//! ```

use std::collections::HashMap;
use std::str::Utf8Error;
use std::sync::OnceLock;

use bytes::Bytes;

use crate::error::Result;

/// Transport-supplied key/value pairs.
pub type Metadata = HashMap<String, String>;

/// A single inbound invocation.
///
/// Immutable once constructed and scoped to one invocation.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    metadata: Metadata,
    body: Bytes,
    /// Cached UTF-8 decode of `body`.
    text: OnceLock<std::result::Result<String, Utf8Error>>,
}

impl InvokeRequest {
    /// Create a request from any key/value iterator and body.
    pub fn new<I, K, V>(metadata: I, body: impl Into<Bytes>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let metadata = metadata
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_parts(metadata, body.into())
    }

    /// Create a request from already-built parts.
    pub fn from_parts(metadata: Metadata, body: Bytes) -> Self {
        Self {
            metadata,
            body,
            text: OnceLock::new(),
        }
    }

    /// Metadata exactly as supplied by the transport.
    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Look up a single metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Raw body bytes.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`FuncwireError::Decode`](crate::FuncwireError::Decode) if the
    /// body is not valid UTF-8. Repeated calls return the cached outcome.
    pub fn text(&self) -> Result<&str> {
        let decoded = self
            .text
            .get_or_init(|| std::str::from_utf8(&self.body).map(str::to_owned));

        match decoded {
            Ok(text) => Ok(text.as_str()),
            Err(e) => Err((*e).into()),
        }
    }
}
