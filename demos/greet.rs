//! Greet function - single handler served over the in-process transport.
//!
//! This demo:
//! - Reads the method name and port from `FUNC_*` environment variables
//! - Loads a handler that logs the request and returns a fixed greeting
//! - Serves it through `LocalTransport` and issues one call
//!
//! ```text
//! RUST_LOG=debug FUNC_NAME=greet cargo run --example greet
//! ```

use std::sync::Arc;

use funcwire::handler::HandlerResult;
use funcwire::{Function, FunctionConfig, FunctionContext, InvokeRequest, LocalTransport};
use tracing_subscriber::EnvFilter;

fn greet(ctx: &FunctionContext<'_>) -> HandlerResult {
    let body = ctx.text()?;
    tracing::info!(metadata = ?ctx.metadata(), body, "Received request");
    Ok("hello!!!!!!".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = FunctionConfig::from_env()?;
    let method = config.name.clone();

    let function = Arc::new(Function::new(config));
    function.load(greet);

    let (transport, client) = LocalTransport::new();
    let server = tokio::spawn(async move { function.run(&transport).await });

    let request = InvokeRequest::new([("lang", "en")], "ignored");
    let response = client.invoke(&method, request).await?;
    println!("{} ({})", response.text()?, response.content_type());

    // Dropping the last client stops the transport
    drop(client);
    server.await??;

    Ok(())
}
