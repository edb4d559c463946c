//! Transport seam - the method-endpoint registration facility.
//!
//! The runtime does not implement a wire transport. It talks to one through
//! two traits:
//! - [`MethodEndpoint`] - what the transport calls for each inbound invocation
//! - [`Transport`] - where endpoints are bound by name and where `listen` runs
//!
//! [`LocalTransport`] is an in-process implementation that feeds calls through
//! a channel. It has no sockets and no framing.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use funcwire::transport::{BoxFuture, EndpointTable, MethodEndpoint};
//! use funcwire::{InvokeRequest, InvokeResponse, Result};
//!
//! struct Echo;
//!
//! impl MethodEndpoint for Echo {
//!     fn call(&self, request: InvokeRequest) -> BoxFuture<'static, Result<InvokeResponse>> {
//!         Box::pin(async move { Ok(InvokeResponse::from_output(request.text()?.to_string())) })
//!     }
//! }
//!
//! let table = Arc::new(EndpointTable::new());
//! let binding = EndpointTable::bind(&table, "echo", Arc::new(Echo)).unwrap();
//! assert!(table.contains("echo"));
//!
//! binding.unbind();
//! assert!(!table.contains("echo"));
//! ```

mod local;
mod table;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;
use crate::request::InvokeRequest;
use crate::response::InvokeResponse;

pub use local::{LocalClient, LocalTransport, LocalTransportConfig};
pub use table::{Binding, EndpointTable};

/// Boxed future for endpoint results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A named entry point the transport routes inbound calls to.
pub trait MethodEndpoint: Send + Sync + 'static {
    /// Handle one inbound call.
    fn call(&self, request: InvokeRequest) -> BoxFuture<'static, Result<InvokeResponse>>;
}

/// An external transport exposing named method endpoints.
pub trait Transport: Send + Sync {
    /// Endpoint table the transport dispatches from.
    fn endpoints(&self) -> &Arc<EndpointTable>;

    /// Bind `endpoint` under `name`. Dropping the returned [`Binding`] unbinds it.
    fn bind(&self, name: &str, endpoint: Arc<dyn MethodEndpoint>) -> Result<Binding> {
        EndpointTable::bind(self.endpoints(), name, endpoint)
    }

    /// Serve inbound calls until the transport shuts down.
    ///
    /// `port` is passed through as configured.
    fn listen(&self, port: u16) -> BoxFuture<'_, Result<()>>;
}
