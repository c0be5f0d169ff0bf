//! Auth handshake specs
//!
//! The first line on a fresh connection must be an `auth` frame when the
//! server requires authentication.

use crate::prelude::*;

#[tokio::test]
async fn request_before_auth_is_rejected() {
    let server = test_server().await;
    let mut peer = RawPeer::connect(&server).await;

    peer.send(&json!({ "method": "a.test", "params": ["a"], "id": "early" })).await;

    let response = peer.recv().await.unwrap();
    assert_eq!(
        response,
        json!({
            "result": null,
            "error": "This server requires authentication (the `auth` property is missing).",
            "id": "early",
        })
    );
    assert_eq!(peer.recv().await, None);
}

#[tokio::test]
async fn successful_handshake_returns_api() {
    let server = test_server().await;
    let mut peer = RawPeer::connect(&server).await;

    peer.send(&json!({ "auth": null, "id": "h" })).await;
    let response = peer.recv().await.unwrap();
    assert_eq!(response["error"], Value::Null);
    assert_eq!(response["id"], json!("h"));
    let api = response["result"]["api"].as_object().unwrap();
    assert!(api.contains_key("a.test"));
    assert!(api.contains_key("a.error"));

    peer.send(&json!({ "method": "a.test", "params": ["x"], "id": 1 })).await;
    assert_eq!(peer.recv().await.unwrap(), json!({ "result": "x1", "error": null, "id": 1 }));
}

#[tokio::test]
async fn auth_context_reaches_every_handler() {
    let server = ServerBuilder::new(ServerConfig::load().with_require_auth(true))
        .auth(AuthHandler::future(|material: Value| async move {
            match material["user"].as_str() {
                Some(user) => Ok(json!({ "user": user, "role": "admin" })),
                None => Err(HandlerError::new("Unauthorized")),
            }
        }))
        .route_sync("whoami", |call| Ok(call.context.value()["user"].clone()))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();

    let client = Client::connect_with_auth(
        [Target::from(server.local_addr())],
        client_config(),
        StaticAuth(json!({ "user": "ada" })),
    );
    tokio::time::timeout(SPEC_WAIT, client.wait_ready()).await.unwrap().unwrap();

    assert_eq!(client.send_request("whoami", vec![]).await.unwrap(), json!("ada"));
}

#[tokio::test]
async fn rejected_client_reports_auth_error_and_never_opens() {
    let server = ServerBuilder::new(ServerConfig::load().with_require_auth(true))
        .auth(AuthHandler::callback(|material, responder| {
            if material == json!(123) {
                responder.ok("ok");
            } else {
                responder.err("Unauthorized");
            }
        }))
        .listen("127.0.0.1:0")
        .await
        .unwrap();

    let client = Client::connect_with_auth(
        [Target::from(server.local_addr())],
        client_config().with_retry_floor(Duration::from_secs(60)),
        StaticAuth(json!(0)),
    );
    let mut events = client.subscribe();

    let event = next_event(&mut events, |e| matches!(e, ClientEvent::AuthError { .. })).await;
    assert!(matches!(event, ClientEvent::AuthError { message, .. } if message == "Unauthorized"));
    assert!(!client.is_ready());
    assert!(client.proxy().is_none());
}

#[tokio::test]
async fn open_server_skips_the_handshake() {
    let server = open_server()
        .route_sync("ping", |call| Ok(call.context.value().clone()))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();
    let mut peer = RawPeer::connect(&server).await;

    peer.send(&json!({ "method": "ping", "params": [], "id": "p" })).await;
    assert_eq!(peer.recv().await.unwrap(), json!({ "result": null, "error": null, "id": "p" }));
}
