//! Function configuration.
//!
//! The method name and listen port are the only values the runtime consumes;
//! both are passed through to the transport untouched. The error policy picks
//! how invocation failures reach the transport.
//!
//! Configuration can be built fluently, parsed from JSON, or read from the
//! environment:
//!
//! | Variable            | Field          | Values                              |
//! |---------------------|----------------|-------------------------------------|
//! | `FUNC_NAME`         | `name`         | any string                          |
//! | `FUNC_PORT`         | `port`         | `0..=65535`                         |
//! | `FUNC_ERROR_POLICY` | `error_policy` | `fail-fast`, `respond-with-error`   |
//!
//! # Example
//!
//! ```
//! use funcwire::{ErrorPolicy, FunctionConfig};
//!
//! let config = FunctionConfig::new("greet")
//!     .port(8080)
//!     .error_policy(ErrorPolicy::RespondWithError);
//!
//! assert_eq!(config.name, "greet");
//! assert_eq!(config.port, 8080);
//! ```

use std::str::FromStr;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{FuncwireError, Result};

/// Default method name.
pub const DEFAULT_NAME: &str = "function";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 50001;

pub const ENV_NAME: &str = "FUNC_NAME";
pub const ENV_PORT: &str = "FUNC_PORT";
pub const ENV_ERROR_POLICY: &str = "FUNC_ERROR_POLICY";

/// Prefix shared by the environment variables above.
const ENV_PREFIX: &str = "FUNC";

/// How invocation failures are reported to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Return the error to the transport, which decides what the caller sees.
    #[default]
    FailFast,
    /// Turn the error into an error-status response carrying its message.
    RespondWithError,
}

impl FromStr for ErrorPolicy {
    type Err = FuncwireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail-fast" => Ok(ErrorPolicy::FailFast),
            "respond-with-error" => Ok(ErrorPolicy::RespondWithError),
            other => Err(FuncwireError::Config(format!(
                "unknown error policy '{}'",
                other
            ))),
        }
    }
}

/// Configuration of a [`Function`](crate::Function).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Method name the function answers to.
    pub name: String,
    /// Port handed to the transport's `listen`.
    pub port: u16,
    pub error_policy: ErrorPolicy,
}

impl FunctionConfig {
    /// Create a configuration with the given method name and defaults otherwise.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the listen port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_builder(Config::builder().add_source(File::from_str(json, FileFormat::Json)))
    }

    /// Read configuration from the `FUNC_*` process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(env: Environment) -> Result<Self> {
        Self::from_builder(Config::builder().add_source(env))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the transport cannot bind.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FuncwireError::Config(
                "method name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            port: DEFAULT_PORT,
            error_policy: ErrorPolicy::default(),
        }
    }
}
