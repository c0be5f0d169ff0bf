//! Audit and error event specs

use crate::prelude::*;

#[tokio::test]
async fn audit_event_carries_timings_context_and_id() {
    let server = ServerBuilder::new(ServerConfig::load().with_require_auth(true))
        .auth(AuthHandler::sync(|_| Ok(json!("ok"))))
        .route_sync("a.test", |call| Ok(json!(format!("{}1", call.param::<String>(0)?))))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();
    let mut events = server.subscribe();
    let client = ready_client(&[&server], client_config()).await;

    client.send_request("a.test", vec![json!("a")]).await.unwrap();

    let ServerEvent::Audit(record) =
        next_event(&mut events, |e| matches!(e, ServerEvent::Audit(_))).await
    else {
        unreachable!()
    };
    assert_eq!(record.method, "a.test");
    assert_eq!(record.params, vec![json!("a")]);
    assert_eq!(record.result, json!("a1"));
    assert_eq!(record.context.value(), &json!("ok"));
    assert!(record.id.is_some());

    let timings = serde_json::to_value(&record.timings).unwrap();
    let steps: Vec<_> =
        timings["steps"].as_array().unwrap().iter().map(|s| s["name"].clone()).collect();
    assert_eq!(steps, vec![json!("parse"), json!("process")]);
    assert!(timings["total"].as_u64().unwrap() >= timings["steps"][0]["elapsedMicros"].as_u64().unwrap());
}

#[tokio::test]
async fn failed_call_emits_error_event_with_timings() {
    let server = test_server().await;
    let mut events = server.subscribe();
    let client = ready_client(&[&server], client_config()).await;

    client.send_request("a.error", vec![]).await.unwrap_err();

    let ServerEvent::Error(record) = next_event(&mut events, |e| {
        matches!(e, ServerEvent::Error(r) if r.kind == ErrorKind::Handler)
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(record.message, "Nope");
    assert_eq!(record.method.as_deref(), Some("a.error"));
    assert!(record.responded);
    assert_eq!(record.timings.unwrap().step_names(), vec!["parse", "error"]);
}

#[tokio::test]
async fn notification_is_audited_without_response() {
    let server = open_server()
        .route_sync("log.write", |_| Ok(json!(true)))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();
    let mut events = server.subscribe();
    let mut peer = RawPeer::connect(&server).await;

    peer.send(&json!({ "method": "log.write", "params": ["hello"] })).await;
    let ServerEvent::Audit(record) =
        next_event(&mut events, |e| matches!(e, ServerEvent::Audit(_))).await
    else {
        unreachable!()
    };
    assert_eq!(record.id, None);

    // The next response on the wire belongs to the next request
    peer.send(&json!({ "method": "log.write", "params": [], "id": "after" })).await;
    assert_eq!(peer.recv().await.unwrap()["id"], json!("after"));
}

#[tokio::test]
async fn malformed_frames_are_reported_per_line() {
    let server = open_server()
        .route_sync("ping", |_| Ok(json!("pong")))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();
    let mut events = server.subscribe();
    let mut peer = RawPeer::connect(&server).await;

    peer.send(&json!({ "params": [], "id": "m" })).await;
    assert_eq!(peer.recv().await.unwrap()["error"], json!("Missing `method` property"));

    peer.send_raw("this is not json").await;
    let ServerEvent::Error(record) = next_event(&mut events, |e| {
        matches!(e, ServerEvent::Error(r) if r.kind == ErrorKind::Decode)
    })
    .await
    else {
        unreachable!()
    };
    assert!(!record.responded);

    peer.send(&json!({ "method": "ping", "params": [], "id": "ok" })).await;
    assert_eq!(peer.recv().await.unwrap()["result"], json!("pong"));
}
