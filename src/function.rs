//! Invocation context.
//!
//! A [`Function`] owns the single handler slot and the method name it answers
//! to. It is created once, shared behind an `Arc`, and never stores
//! per-invocation state: every call to [`Function::invoke`] builds its own
//! [`FunctionContext`] around the request it was given.
//!
//! # Example
//!
//! ```
//! use funcwire::{Function, FunctionConfig, FunctionContext, InvokeRequest};
//!
//! let function = Function::new(FunctionConfig::new("greet"));
//! function.load(|_ctx: &FunctionContext<'_>| "hello!!!!!!");
//!
//! let request = InvokeRequest::new([("lang", "en")], "ignored");
//! assert_eq!(function.invoke(&request).unwrap(), "hello!!!!!!");
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{ErrorPolicy, FunctionConfig};
use crate::endpoint::FunctionEndpoint;
use crate::error::{FuncwireError, Result};
use crate::handler::{FunctionContext, Handler, HandlerSlot, IntoHandlerOutput, LoadedHandler};
use crate::request::InvokeRequest;
use crate::transport::Transport;

/// A single user function bound to one named method.
#[derive(Debug)]
pub struct Function {
    /// Method name; last `register` wins.
    name: ArcSwap<String>,
    port: u16,
    error_policy: ErrorPolicy,
    handler: HandlerSlot,
    /// Invocations started so far.
    invocations: AtomicU64,
}

impl Function {
    /// Create a function with no handler loaded.
    pub fn new(config: FunctionConfig) -> Self {
        Self {
            name: ArcSwap::from_pointee(config.name),
            port: config.port,
            error_policy: config.error_policy,
            handler: HandlerSlot::new(),
            invocations: AtomicU64::new(0),
        }
    }

    /// Set the method name this function answers to.
    ///
    /// Takes effect at the next [`run`](Self::run).
    pub fn register(&self, name: impl Into<String>) {
        self.name.store(Arc::new(name.into()));
    }

    /// Current method name.
    pub fn name(&self) -> Arc<String> {
        self.name.load_full()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Number of invocations that reached a loaded handler.
    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Load the user handler, replacing any previous one.
    ///
    /// Returns the replaced handler so the replacement is observable.
    pub fn load<F, R>(&self, handler: F) -> Option<Arc<LoadedHandler>>
    where
        F: Fn(&FunctionContext<'_>) -> R + Send + Sync + 'static,
        R: IntoHandlerOutput + 'static,
    {
        let previous = self.handler.load(handler);
        self.log_replacement(previous.as_deref());
        previous
    }

    /// Load a [`Handler`] implementation, replacing any previous one.
    pub fn load_handler<H: Handler>(&self, handler: H) -> Option<Arc<LoadedHandler>> {
        let previous = self.handler.load_handler(handler);
        self.log_replacement(previous.as_deref());
        previous
    }

    fn log_replacement(&self, previous: Option<&LoadedHandler>) {
        match previous {
            Some(previous) => tracing::warn!(
                method = %self.name(),
                replaced_generation = previous.generation(),
                "User function replaced"
            ),
            None => tracing::debug!(method = %self.name(), "User function loaded"),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.handler.is_loaded()
    }

    /// Run the loaded handler against `request` and return its output.
    ///
    /// A `load` racing with this call does not affect it; the handler is
    /// snapshotted before it runs.
    ///
    /// # Errors
    ///
    /// - [`FuncwireError::NotLoaded`] if no handler has been loaded
    /// - [`FuncwireError::Handler`] if the handler failed; funcwire errors
    ///   raised inside the handler (such as `Decode`) come back unchanged
    pub fn invoke(&self, request: &InvokeRequest) -> Result<String> {
        let handler = self.handler.current().ok_or(FuncwireError::NotLoaded)?;

        let name = self.name.load_full();
        let invocation_id = self.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        let ctx = FunctionContext::new(&name, self.port, invocation_id, request);

        tracing::debug!(
            method = %name,
            invocation_id,
            generation = handler.generation(),
            "Invoking user function"
        );

        handler.call(&ctx).map_err(FuncwireError::from_handler)
    }

    /// Bind this function under its method name and serve calls.
    ///
    /// Returns when the transport stops listening. The binding is released
    /// before returning.
    pub async fn run<T>(self: Arc<Self>, transport: &T) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        let name = self.name();
        let port = self.port;

        let binding = transport.bind(&name, Arc::new(FunctionEndpoint::new(self)))?;
        tracing::info!(method = %name, port, "Function bound");

        let result = transport.listen(port).await;

        binding.unbind();
        tracing::info!(method = %name, "Function unbound");
        result
    }
}
