//! Handler trait and the single-slot handler registry.
//!
//! Exactly one handler is loaded at a time. Loading a new handler replaces
//! the previous one and hands it back to the caller, so replacement is never
//! silent.
//!
//! # Example
//!
//! ```
//! use funcwire::handler::HandlerSlot;
//! use funcwire::FunctionContext;
//!
//! let slot = HandlerSlot::new();
//! assert!(slot.load(|_ctx: &FunctionContext<'_>| "first").is_none());
//!
//! let previous = slot.load(|_ctx: &FunctionContext<'_>| "second").unwrap();
//! assert_eq!(previous.generation(), 1);
//! ```

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::FunctionContext;
use crate::error::BoxError;

/// Result type for handler functions.
pub type HandlerResult = std::result::Result<String, BoxError>;

/// Trait for user handlers.
pub trait Handler: Send + Sync + 'static {
    /// Handle one invocation and produce its text output.
    fn call(&self, ctx: &FunctionContext<'_>) -> HandlerResult;
}

/// Values a handler closure may return.
pub trait IntoHandlerOutput {
    fn into_output(self) -> HandlerResult;
}

impl IntoHandlerOutput for String {
    fn into_output(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoHandlerOutput for &'static str {
    fn into_output(self) -> HandlerResult {
        Ok(self.to_string())
    }
}

impl<T, E> IntoHandlerOutput for std::result::Result<T, E>
where
    T: Into<String>,
    E: Into<BoxError>,
{
    fn into_output(self) -> HandlerResult {
        self.map(Into::into).map_err(Into::into)
    }
}

/// Adapts a closure into a [`Handler`].
pub struct FnHandler<F, R>
where
    F: Fn(&FunctionContext<'_>) -> R + Send + Sync + 'static,
    R: IntoHandlerOutput,
{
    handler: F,
    _phantom: PhantomData<fn() -> R>,
}

impl<F, R> FnHandler<F, R>
where
    F: Fn(&FunctionContext<'_>) -> R + Send + Sync + 'static,
    R: IntoHandlerOutput,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, R> Handler for FnHandler<F, R>
where
    F: Fn(&FunctionContext<'_>) -> R + Send + Sync + 'static,
    R: IntoHandlerOutput + 'static,
{
    fn call(&self, ctx: &FunctionContext<'_>) -> HandlerResult {
        (self.handler)(ctx).into_output()
    }
}

/// A handler together with the generation it was loaded at.
pub struct LoadedHandler {
    handler: Box<dyn Handler>,
    generation: u64,
}

impl LoadedHandler {
    /// Load generation, starting at 1 for the first handler.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn call(&self, ctx: &FunctionContext<'_>) -> HandlerResult {
        self.handler.call(ctx)
    }
}

impl std::fmt::Debug for LoadedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedHandler")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Single-slot handler registry.
///
/// Reads take a lock-free snapshot, so an invocation already running keeps
/// the handler it started with even if another thread loads a new one.
#[derive(Default)]
pub struct HandlerSlot {
    current: ArcSwapOption<LoadedHandler>,
    generations: AtomicU64,
}

impl HandlerSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a handler closure. Returns the handler it replaced, if any.
    pub fn load<F, R>(&self, handler: F) -> Option<Arc<LoadedHandler>>
    where
        F: Fn(&FunctionContext<'_>) -> R + Send + Sync + 'static,
        R: IntoHandlerOutput + 'static,
    {
        self.load_handler(FnHandler::new(handler))
    }

    /// Load any [`Handler`]. Returns the handler it replaced, if any.
    pub fn load_handler<H: Handler>(&self, handler: H) -> Option<Arc<LoadedHandler>> {
        let generation = self.generations.fetch_add(1, Ordering::AcqRel) + 1;
        let loaded = Arc::new(LoadedHandler {
            handler: Box::new(handler),
            generation,
        });
        self.current.swap(Some(loaded))
    }

    /// Snapshot of the currently loaded handler.
    pub fn current(&self) -> Option<Arc<LoadedHandler>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("current", &self.current.load_full().map(|h| h.generation))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::InvokeRequest;

    struct Upper;

    impl Handler for Upper {
        fn call(&self, ctx: &FunctionContext<'_>) -> HandlerResult {
            Ok(ctx.text()?.to_uppercase())
        }
    }

    fn call(slot: &HandlerSlot, body: &'static str) -> HandlerResult {
        let request = InvokeRequest::new([("k", "v")], body);
        let ctx = FunctionContext::new("test", 0, 1, &request);
        slot.current().expect("handler loaded").call(&ctx)
    }

    #[test]
    fn test_empty_slot() {
        let slot = HandlerSlot::new();
        assert!(!slot.is_loaded());
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_load_closure_returning_str() {
        let slot = HandlerSlot::new();
        assert!(slot.load(|_ctx: &FunctionContext<'_>| "hello!!!!!!").is_none());
        assert!(slot.is_loaded());
        assert_eq!(call(&slot, "ignored").unwrap(), "hello!!!!!!");
    }

    #[test]
    fn test_load_closure_returning_result() {
        let slot = HandlerSlot::new();
        slot.load(|ctx: &FunctionContext<'_>| -> HandlerResult {
            Ok(format!("{}:{}", ctx.text()?, ctx.metadata()["k"]))
        });
        assert_eq!(call(&slot, "body").unwrap(), "body:v");
    }

    #[test]
    fn test_load_trait_handler() {
        let slot = HandlerSlot::new();
        slot.load_handler(Upper);
        assert_eq!(call(&slot, "shout").unwrap(), "SHOUT");
    }

    #[test]
    fn test_handler_error_passes_through() {
        let slot = HandlerSlot::new();
        slot.load(|_ctx: &FunctionContext<'_>| Err::<String, _>("nope"));
        assert_eq!(call(&slot, "x").unwrap_err().to_string(), "nope");
    }

    #[test]
    fn test_reload_returns_previous() {
        let slot = HandlerSlot::new();
        slot.load(|_ctx: &FunctionContext<'_>| "h1");

        let previous = slot.load(|_ctx: &FunctionContext<'_>| "h2").unwrap();
        assert_eq!(previous.generation(), 1);
        assert_eq!(slot.current().unwrap().generation(), 2);
        assert_eq!(call(&slot, "x").unwrap(), "h2");
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let slot = HandlerSlot::new();
        slot.load(|_ctx: &FunctionContext<'_>| "old");
        let snapshot = slot.current().unwrap();

        slot.load(|_ctx: &FunctionContext<'_>| "new");

        let request = InvokeRequest::new(crate::request::Metadata::new(), "");
        let ctx = FunctionContext::new("test", 0, 1, &request);
        assert_eq!(snapshot.call(&ctx).unwrap(), "old");
        assert_eq!(slot.current().unwrap().call(&ctx).unwrap(), "new");
    }
}
