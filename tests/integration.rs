//! Integration tests for funcwire.
//!
//! These tests drive a `Function` end to end through `LocalTransport`.

use std::sync::{Arc, Barrier};

use funcwire::handler::HandlerResult;
use funcwire::transport::Transport;
use funcwire::{
    ErrorPolicy, Function, FunctionConfig, FunctionContext, FuncwireError, InvokeRequest,
    LocalClient, LocalTransport, CONTENT_TYPE,
};
use tokio::task::JoinHandle;

/// Start `function` on a fresh local transport.
fn serve(function: Arc<Function>) -> (LocalClient, JoinHandle<funcwire::Result<()>>) {
    let (transport, client) = LocalTransport::new();
    let server = tokio::spawn(async move { function.run(&transport).await });
    (client, server)
}

/// Test the greet scenario from registration to response bytes.
#[tokio::test]
async fn test_greet_end_to_end() {
    let function = Arc::new(Function::new(FunctionConfig::default()));
    function.register("greet");
    function.load(|_ctx: &FunctionContext<'_>| "hello!!!!!!");

    let (client, server) = serve(function);

    let request = InvokeRequest::new([("lang", "en")], &b"ignored"[..]);
    let response = client.invoke("greet", request).await.unwrap();

    assert_eq!(response.data().as_ref(), b"hello!!!!!!");
    assert_eq!(response.content_type(), "text/plain; charset=UTF-8");
    assert_eq!(response.content_type(), CONTENT_TYPE);
    assert!(!response.is_error());

    drop(client);
    server.await.unwrap().unwrap();
}

/// Test that the handler sees the request metadata and text it was sent.
#[tokio::test]
async fn test_handler_reads_request() {
    let function = Arc::new(Function::new(FunctionConfig::new("echo")));
    function.load(|ctx: &FunctionContext<'_>| -> HandlerResult {
        let mut keys: Vec<_> = ctx.metadata().iter().map(|(k, v)| format!("{k}={v}")).collect();
        keys.sort();
        Ok(format!("{} | {}", keys.join(","), ctx.text()?))
    });

    let (client, server) = serve(function);

    let request = InvokeRequest::new([("b", "2"), ("a", "1")], "payload");
    let response = client.invoke("echo", request).await.unwrap();
    assert_eq!(response.text().unwrap(), "a=1,b=2 | payload");

    drop(client);
    server.await.unwrap().unwrap();
}

/// Test that calls before `load` fail without stopping the function.
#[tokio::test]
async fn test_not_loaded_then_loaded() {
    let function = Arc::new(Function::new(FunctionConfig::new("late")));
    let (client, server) = serve(function.clone());

    let result = client.invoke("late", InvokeRequest::new([("k", "v")], "x")).await;
    assert!(matches!(result, Err(FuncwireError::NotLoaded)));

    function.load(|_ctx: &FunctionContext<'_>| "now loaded");
    let response = client.invoke("late", InvokeRequest::new([("k", "v")], "x")).await.unwrap();
    assert_eq!(response.text().unwrap(), "now loaded");

    drop(client);
    server.await.unwrap().unwrap();
}

/// Test invalid UTF-8 bodies under both error policies.
#[tokio::test]
async fn test_decode_error_policies() {
    let handler = |ctx: &FunctionContext<'_>| -> HandlerResult { Ok(ctx.text()?.to_string()) };
    let bad_body: &'static [u8] = &[0xf0, 0x28, 0x8c, 0x28];

    let fail_fast = Arc::new(Function::new(FunctionConfig::new("strict")));
    fail_fast.load(handler);
    let (client, server) = serve(fail_fast);
    let result = client.invoke("strict", InvokeRequest::new([("k", "v")], bad_body)).await;
    assert!(matches!(result, Err(FuncwireError::Decode(_))));
    drop(client);
    server.await.unwrap().unwrap();

    let lenient = Arc::new(Function::new(
        FunctionConfig::new("lenient").error_policy(ErrorPolicy::RespondWithError),
    ));
    lenient.load(handler);
    let (client, server) = serve(lenient);
    let response = client
        .invoke("lenient", InvokeRequest::new([("k", "v")], bad_body))
        .await
        .unwrap();
    assert!(response.is_error());
    assert!(response.text().unwrap().starts_with("Request body is not valid UTF-8"));
    drop(client);
    server.await.unwrap().unwrap();
}

/// Test that only the registered method name is routed.
#[tokio::test]
async fn test_only_registered_name_is_bound() {
    let function = Arc::new(Function::new(FunctionConfig::new("old")));
    function.register("new");
    function.load(|_ctx: &FunctionContext<'_>| "ok");

    let (client, server) = serve(function);

    let result = client.invoke("old", InvokeRequest::new([("k", "v")], "")).await;
    assert!(matches!(result, Err(FuncwireError::MethodNotFound(name)) if name == "old"));
    assert!(client.invoke("new", InvokeRequest::new([("k", "v")], "")).await.is_ok());

    drop(client);
    server.await.unwrap().unwrap();
}

/// Test that `run` fails when the method name is already taken.
#[tokio::test]
async fn test_run_rejects_taken_name() {
    let (transport, _client) = LocalTransport::new();
    let first = Arc::new(Function::new(FunctionConfig::new("greet")));
    let _binding = transport
        .bind("greet", Arc::new(funcwire::endpoint::FunctionEndpoint::new(first)))
        .unwrap();

    let second = Arc::new(Function::new(FunctionConfig::new("greet")));
    let result = second.run(&transport).await;
    assert!(matches!(result, Err(FuncwireError::AlreadyBound(_))));
}

/// Test that `run` releases its binding once the transport stops.
#[tokio::test]
async fn test_run_unbinds_on_shutdown() {
    let (transport, client) = LocalTransport::new();
    let transport = Arc::new(transport);
    let function = Arc::new(Function::new(FunctionConfig::new("greet")));
    function.load(|_ctx: &FunctionContext<'_>| "hi");

    let server = {
        let transport = transport.clone();
        tokio::spawn(async move { function.run(transport.as_ref()).await })
    };

    assert!(client.invoke("greet", InvokeRequest::new([("k", "v")], "")).await.is_ok());
    assert!(transport.endpoints().contains("greet"));

    drop(client);
    server.await.unwrap().unwrap();
    assert!(!transport.endpoints().contains("greet"));
}

/// Test that concurrent invocations never observe each other's request.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_invocations_isolated() {
    let function = Arc::new(Function::new(FunctionConfig::new("isolate")));
    let barrier = Arc::new(Barrier::new(2));

    let gate = barrier.clone();
    function.load(move |ctx: &FunctionContext<'_>| -> HandlerResult {
        // Hold both invocations inside the handler at once
        gate.wait();
        let id = ctx.request().metadata_value("id").unwrap_or_default().to_string();
        Ok(format!("{}:{}", id, ctx.text()?))
    });

    let (client, server) = serve(function);

    let call_a = {
        let client = client.clone();
        tokio::spawn(async move { client.invoke("isolate", InvokeRequest::new([("id", "A")], "rA")).await })
    };
    let call_b = {
        let client = client.clone();
        tokio::spawn(async move { client.invoke("isolate", InvokeRequest::new([("id", "B")], "rB")).await })
    };

    let response_a = call_a.await.unwrap().unwrap();
    let response_b = call_b.await.unwrap().unwrap();
    assert_eq!(response_a.text().unwrap(), "A:rA");
    assert_eq!(response_b.text().unwrap(), "B:rB");

    drop(client);
    server.await.unwrap().unwrap();
}

/// Test that reloading mid-service switches every later call to the new handler.
#[tokio::test]
async fn test_reload_while_serving() {
    let function = Arc::new(Function::new(FunctionConfig::new("swap")));
    function.load(|_ctx: &FunctionContext<'_>| "h1");
    let (client, server) = serve(function.clone());

    let response = client.invoke("swap", InvokeRequest::new([("k", "v")], "")).await.unwrap();
    assert_eq!(response.text().unwrap(), "h1");

    let previous = function.load(|_ctx: &FunctionContext<'_>| "h2");
    assert_eq!(previous.map(|h| h.generation()), Some(1));

    for _ in 0..5 {
        let response = client.invoke("swap", InvokeRequest::new([("k", "v")], "")).await.unwrap();
        assert_eq!(response.text().unwrap(), "h2");
    }

    drop(client);
    server.await.unwrap().unwrap();
}
