//! Call-scoped context handed to the user handler.
//!
//! A [`FunctionContext`] is created fresh for every invocation and borrows
//! that invocation's request, so it cannot outlive the call and concurrent
//! invocations never see each other's data.
//!
//! # Example
//!
//! ```
//! use funcwire::{FunctionContext, InvokeRequest};
//!
//! let request = InvokeRequest::new([("lang", "en")], "hi");
//! let ctx = FunctionContext::new("greet", 50001, 1, &request);
//!
//! assert_eq!(ctx.name(), "greet");
//! assert_eq!(ctx.text().unwrap(), "hi");
//! ```

use crate::error::Result;
use crate::request::{InvokeRequest, Metadata};

/// Context passed to the user handler.
///
/// Cheap to build: it only holds borrows plus two integers.
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext<'a> {
    /// Method name the function is registered under.
    name: &'a str,
    /// Port the function was configured to listen on.
    port: u16,
    /// Sequence number of this invocation (starts at 1).
    invocation_id: u64,
    /// Request of this invocation.
    request: &'a InvokeRequest,
}

impl<'a> FunctionContext<'a> {
    /// Create a context for one invocation.
    pub fn new(name: &'a str, port: u16, invocation_id: u64, request: &'a InvokeRequest) -> Self {
        Self {
            name,
            port,
            invocation_id,
            request,
        }
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn invocation_id(&self) -> u64 {
        self.invocation_id
    }

    /// The request being handled.
    #[inline]
    pub fn request(&self) -> &'a InvokeRequest {
        self.request
    }

    /// Shorthand for `self.request().metadata()`.
    pub fn metadata(&self) -> &'a Metadata {
        self.request.metadata()
    }

    /// Shorthand for `self.request().text()`.
    pub fn text(&self) -> Result<&'a str> {
        self.request.text()
    }
}
