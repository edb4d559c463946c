//! Handler module - the user handler and the context it receives.
//!
//! Provides:
//! - [`Handler`] - the handler capability (any `Fn(&FunctionContext) -> text`)
//! - [`HandlerSlot`] - single-slot registry holding the loaded handler
//! - [`FunctionContext`] - per-invocation view handed to the handler
//!
//! # Example
//!
//! ```
//! use funcwire::handler::{HandlerResult, HandlerSlot};
//! use funcwire::FunctionContext;
//!
//! let slot = HandlerSlot::new();
//! slot.load(|ctx: &FunctionContext<'_>| -> HandlerResult {
//!     Ok(format!("got {} bytes", ctx.request().body().len()))
//! });
//! assert!(slot.is_loaded());
//! ```

mod context;
mod slot;

pub use context::FunctionContext;
pub use slot::{FnHandler, Handler, HandlerResult, HandlerSlot, IntoHandlerOutput, LoadedHandler};
