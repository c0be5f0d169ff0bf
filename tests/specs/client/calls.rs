//! Client call specs
//!
//! Calls through the generated proxy and the flat request API.

use crate::prelude::*;

#[tokio::test]
async fn proxy_call_resolves_to_handler_result() {
    let server = test_server().await;
    let client = ready_client(&[&server], client_config()).await;

    let proxy = client.proxy().unwrap();
    let result = proxy.namespace("a").unwrap().method("test").unwrap().call(vec![json!("a")]).await;
    assert_eq!(result.unwrap(), json!("a1"));
}

#[tokio::test]
async fn handler_error_rejects_the_caller() {
    let server = test_server().await;
    let client = ready_client(&[&server], client_config()).await;

    let stub = client.proxy().unwrap().method("a.error").unwrap();
    let err = stub.call(vec![json!("a")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(_)));
    assert!(err.to_string().to_lowercase().contains("nope"), "{err}");
}

#[tokio::test]
async fn callback_style_call_completes_once() {
    let server = test_server().await;
    let client = ready_client(&[&server], client_config()).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let stub = client.proxy().unwrap().method("a.test").unwrap();
    stub.call_with(vec![json!("b")], move |result| {
        let _ = tx.send(result);
    });

    assert_eq!(rx.recv().await.unwrap().unwrap(), json!("b1"));
    // Sender was consumed by the single callback invocation
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn unknown_method_is_a_remote_error() {
    let server = test_server().await;
    let client = ready_client(&[&server], client_config()).await;

    let err = client.send_request("a.missing", vec![]).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(m) if m == "Unknown method `a.missing`"));
}

#[tokio::test]
async fn proxy_mirrors_described_routes() {
    let server = auth_server()
        .route_sync("math.add", |call| Ok(json!(call.param::<i64>(0)? + call.param::<i64>(1)?)))
        .unwrap()
        .describe(
            "math.add",
            "Adds two integers",
            vec![
                ParamSpec::new("a", "integer", "left operand").required(true),
                ParamSpec::new("b", "integer", "right operand").required(true),
            ],
            Some(ReturnSpec::new("integer", "the sum")),
        )
        .unwrap()
        .route_sync("math.zero", |_| Ok(json!(0)))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();
    let client = ready_client(&[&server], client_config()).await;

    let proxy = client.proxy().unwrap();
    assert_eq!(proxy.routes().collect::<Vec<_>>(), vec!["math.add", "math.zero"]);

    let add = proxy.descriptor().get("math.add").unwrap();
    assert_eq!(add.description, "Adds two integers");
    assert_eq!(add.params.len(), 2);
    assert_eq!(proxy.descriptor().get("math.zero").unwrap().description, "No description available.");

    let sum = proxy.method("math.add").unwrap().call(vec![json!(2), json!(3)]).await.unwrap();
    assert_eq!(sum, json!(5));
}
