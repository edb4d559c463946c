//! Error types for funcwire.

use thiserror::Error;

/// Boxed error returned by user handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all funcwire operations.
#[derive(Debug, Error)]
pub enum FuncwireError {
    /// `invoke` was called before any handler was loaded.
    #[error("User function is not loaded")]
    NotLoaded,

    /// Request body is not valid UTF-8.
    #[error("Request body is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// The user handler returned an error.
    #[error("Handler error: {0}")]
    Handler(BoxError),

    /// The user handler panicked.
    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),

    /// No endpoint is bound under the given method name.
    #[error("No endpoint bound for method: {0}")]
    MethodNotFound(String),

    /// An endpoint is already bound under the given method name.
    #[error("Method already bound: {0}")]
    AlreadyBound(String),

    /// `listen` was called on a transport that is already listening.
    #[error("Transport is already listening")]
    AlreadyListening,

    /// Too many calls in flight.
    #[error("Invocation capacity reached")]
    CapacityReached,

    /// Transport went away before the call completed.
    #[error("Transport closed")]
    TransportClosed,

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for FuncwireError {
    fn from(err: config::ConfigError) -> Self {
        FuncwireError::Config(err.to_string())
    }
}

impl FuncwireError {
    /// Wrap a handler error, keeping funcwire errors raised inside the handler as-is.
    pub fn from_handler(err: BoxError) -> Self {
        match err.downcast::<FuncwireError>() {
            Ok(inner) => *inner,
            Err(other) => FuncwireError::Handler(other),
        }
    }
}

/// Result type alias using FuncwireError.
pub type Result<T> = std::result::Result<T, FuncwireError>;
