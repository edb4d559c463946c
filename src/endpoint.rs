//! Endpoint adapter binding a [`Function`] to a transport.
//!
//! Handlers are synchronous, so each call runs on tokio's blocking pool. The
//! function's [`ErrorPolicy`] decides whether a failed invocation reaches the
//! transport as an error or as an error-status response.

use std::any::Any;
use std::sync::Arc;

use crate::config::ErrorPolicy;
use crate::error::{FuncwireError, Result};
use crate::function::Function;
use crate::request::InvokeRequest;
use crate::response::InvokeResponse;
use crate::transport::{BoxFuture, MethodEndpoint};

/// [`MethodEndpoint`] that routes every call through [`Function::invoke`].
pub struct FunctionEndpoint {
    function: Arc<Function>,
}

impl FunctionEndpoint {
    pub fn new(function: Arc<Function>) -> Self {
        Self { function }
    }

    /// Invoke the function off the async executor.
    async fn invoke(function: Arc<Function>, request: InvokeRequest) -> Result<InvokeResponse> {
        let policy = function.error_policy();

        let outcome = tokio::task::spawn_blocking(move || function.invoke(&request)).await;
        let result = match outcome {
            Ok(result) => result,
            Err(join) if join.is_panic() => Err(FuncwireError::HandlerPanicked(panic_message(
                join.into_panic(),
            ))),
            Err(_) => Err(FuncwireError::TransportClosed),
        };

        match result {
            Ok(output) => Ok(InvokeResponse::from_output(output)),
            Err(e) => match policy {
                ErrorPolicy::FailFast => Err(e),
                ErrorPolicy::RespondWithError => {
                    tracing::warn!("Invocation failed, responding with error: {}", e);
                    Ok(InvokeResponse::from_error(&e))
                }
            },
        }
    }
}

impl MethodEndpoint for FunctionEndpoint {
    fn call(&self, request: InvokeRequest) -> BoxFuture<'static, Result<InvokeResponse>> {
        Box::pin(Self::invoke(self.function.clone(), request))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
