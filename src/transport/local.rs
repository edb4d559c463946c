//! In-process transport.
//!
//! [`LocalClient`]s push calls into a bounded channel; [`LocalTransport::listen`]
//! drains it and dispatches each call to its endpoint in its own task. The
//! number of calls in flight is capped by a semaphore; calls over the cap are
//! rejected rather than queued.
//!
//! `listen` returns once every client has been dropped.
//!
//! # Example
//!
//! ```ignore
//! use funcwire::transport::{LocalTransport, Transport};
//!
//! let (transport, client) = LocalTransport::new();
//! let server = tokio::spawn(async move { transport.listen(50001).await });
//!
//! let response = client.invoke("greet", request).await?;
//! drop(client);
//! server.await??;
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Semaphore};

use super::{BoxFuture, EndpointTable, Transport};
use crate::error::{FuncwireError, Result};
use crate::request::InvokeRequest;
use crate::response::InvokeResponse;

/// Default maximum concurrent calls.
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 256;

/// Default inbound channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Configuration for [`LocalTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTransportConfig {
    /// Calls dispatched concurrently before new ones are rejected.
    pub max_concurrent_calls: usize,
    /// Calls buffered between clients and the dispatch loop.
    pub channel_capacity: usize,
}

impl LocalTransportConfig {
    /// Set the maximum number of concurrent calls. Zero is treated as one.
    ///
    /// Default: 256
    pub fn max_concurrent_calls(mut self, limit: usize) -> Self {
        self.max_concurrent_calls = limit;
        self
    }

    /// Set the inbound channel capacity.
    ///
    /// Default: 1024
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for LocalTransportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// A call travelling from a client to the dispatch loop.
struct InboundCall {
    method: String,
    request: InvokeRequest,
    reply: oneshot::Sender<Result<InvokeResponse>>,
}

/// In-process transport driven by [`LocalClient`]s.
pub struct LocalTransport {
    endpoints: Arc<EndpointTable>,
    /// Taken by the first `listen` call.
    inbound: Mutex<Option<mpsc::Receiver<InboundCall>>>,
    max_concurrent_calls: usize,
}

impl LocalTransport {
    /// Create a transport with default configuration and its first client.
    pub fn new() -> (Self, LocalClient) {
        Self::with_config(LocalTransportConfig::default())
    }

    /// Create a transport and its first client.
    pub fn with_config(config: LocalTransportConfig) -> (Self, LocalClient) {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let transport = Self {
            endpoints: Arc::new(EndpointTable::new()),
            inbound: Mutex::new(Some(rx)),
            max_concurrent_calls: config.max_concurrent_calls.max(1),
        };
        (transport, LocalClient { tx })
    }

    /// Dispatch loop - receives calls and hands them to endpoints.
    async fn serve(&self, port: u16) -> Result<()> {
        let mut rx = self
            .inbound
            .lock()
            .take()
            .ok_or(FuncwireError::AlreadyListening)?;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_calls));
        tracing::info!(port, methods = ?self.endpoints.names(), "Local transport listening");

        while let Some(call) = rx.recv().await {
            Self::dispatch_call(call, &self.endpoints, &semaphore);
        }

        tracing::info!(port, "All clients disconnected, local transport stopped");
        Ok(())
    }

    /// Dispatch a single call to its endpoint.
    fn dispatch_call(call: InboundCall, endpoints: &Arc<EndpointTable>, semaphore: &Arc<Semaphore>) {
        let InboundCall {
            method,
            request,
            reply,
        } = call;

        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!("Call capacity reached, rejecting call to {}", method);
                let _ = reply.send(Err(FuncwireError::CapacityReached));
                return;
            }
        };

        let endpoints = endpoints.clone();
        tokio::spawn(async move {
            // Permit is held until this task completes
            let _permit = permit;

            let result = endpoints.dispatch(&method, request).await;
            if let Err(e) = &result {
                tracing::error!("Call to {} failed: {}", method, e);
            }
            // Caller may have given up waiting
            let _ = reply.send(result);
        });
    }
}

impl Transport for LocalTransport {
    fn endpoints(&self) -> &Arc<EndpointTable> {
        &self.endpoints
    }

    fn listen(&self, port: u16) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.serve(port))
    }
}

/// Client side of a [`LocalTransport`].
///
/// Clone it to issue calls from several tasks.
#[derive(Clone)]
pub struct LocalClient {
    tx: mpsc::Sender<InboundCall>,
}

impl LocalClient {
    /// Invoke `method` and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns [`FuncwireError::TransportClosed`] if the transport stopped
    /// before replying, or whatever error the endpoint reported.
    pub async fn invoke(&self, method: &str, request: InvokeRequest) -> Result<InvokeResponse> {
        let (reply, response) = oneshot::channel();
        let call = InboundCall {
            method: method.to_string(),
            request,
            reply,
        };

        self.tx
            .send(call)
            .await
            .map_err(|_| FuncwireError::TransportClosed)?;

        response.await.map_err(|_| FuncwireError::TransportClosed)?
    }

    /// Whether the transport has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
