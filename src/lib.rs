//! # funcwire
//!
//! Minimal function-invocation runtime.
//!
//! A [`Function`] loads exactly one user handler and answers to one named
//! method. Each inbound call is adapted into an [`InvokeRequest`], handed to
//! the handler through a per-call [`FunctionContext`], and the handler's text
//! output becomes an [`InvokeResponse`] with content type
//! `text/plain; charset=UTF-8`.
//!
//! ## Architecture
//!
//! - **Request adapter** ([`InvokeRequest`]): metadata plus lazily decoded body text
//! - **Invocation context** ([`Function`]): `register`, `load`, `invoke`, `run`
//! - **Transport seam** ([`transport`]): named endpoint binding and `listen`,
//!   implemented by the external transport ([`LocalTransport`] in-process)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use funcwire::{Function, FunctionConfig, FunctionContext, LocalTransport};
//!
//! #[tokio::main]
//! async fn main() -> funcwire::Result<()> {
//!     let function = Arc::new(Function::new(FunctionConfig::from_env()?));
//!     function.load(|ctx: &FunctionContext<'_>| format!("hello {}", ctx.text().unwrap_or("")));
//!
//!     let (transport, _client) = LocalTransport::new();
//!     function.run(&transport).await
//! }
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod transport;

mod function;

pub use config::{ErrorPolicy, FunctionConfig};
pub use error::{BoxError, FuncwireError, Result};
pub use function::Function;
pub use handler::{FunctionContext, Handler, HandlerResult};
pub use request::{InvokeRequest, Metadata};
pub use response::{InvokeResponse, ResponseStatus, CONTENT_TYPE};
pub use transport::{LocalClient, LocalTransport, Transport};
