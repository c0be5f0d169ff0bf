//! Connection loss, quarantine and reconnection specs

use crate::prelude::*;

#[tokio::test]
async fn no_servers_means_offline() {
    init_tracing();
    let client = Client::connect(Vec::<Target>::new(), client_config());

    let err = client.send_request("a.test", vec![json!("a")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Offline));
    assert_eq!(err.to_string(), "No connections available");
    assert_eq!(client.outstanding(), 0);
}

#[tokio::test]
async fn destroyed_server_quarantines_its_connection() {
    let server = test_server().await;
    let config = client_config().with_retry_floor(Duration::from_secs(60));
    let client = ready_client(&[&server], config).await;
    let mut events = client.subscribe();

    server.destroy().await;

    next_event(&mut events, |e| matches!(e, ClientEvent::Disconnect { .. })).await;
    next_event(&mut events, |e| *e == ClientEvent::Ready { ready: false }).await;

    let sizes = client.pool_sizes();
    assert_eq!(sizes.open, 0);
    assert_eq!(sizes.pending + sizes.quarantined, 1);

    let err = client.send_request("a.test", vec![json!("a")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Offline));
}

#[tokio::test]
async fn calls_succeed_again_after_reconnect() {
    let server = adding_server(1).await;
    let addr = server.local_addr();
    let client = ready_client(&[&server], client_config()).await;
    let mut events = client.subscribe();

    server.destroy().await;
    next_event(&mut events, |e| *e == ClientEvent::Ready { ready: false }).await;
    assert!(matches!(
        client.send_request("a.test", vec![json!(0)]).await,
        Err(ClientError::Offline)
    ));

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let _server = auth_server()
        .route_sync("a.test", |call| Ok(json!(call.param::<i64>(0)? + 100)))
        .unwrap()
        .listen_on(listener)
        .unwrap();

    next_event(&mut events, |e| *e == ClientEvent::Ready { ready: true }).await;
    assert_eq!(client.send_request("a.test", vec![json!(0)]).await.unwrap(), json!(100));
}

#[tokio::test]
async fn one_server_down_keeps_client_ready() {
    let one = adding_server(1).await;
    let two = adding_server(2).await;
    let config = client_config().with_retry_floor(Duration::from_secs(60));
    let client = ready_client(&[&one, &two], config).await;
    wait_open(&client, 2).await;
    let mut events = client.subscribe();

    one.destroy().await;
    next_event(&mut events, |e| matches!(e, ClientEvent::Disconnect { .. })).await;

    assert!(client.is_ready());
    for _ in 0..3 {
        assert_eq!(client.send_request("a.test", vec![json!(0)]).await.unwrap(), json!(2));
    }
}

#[tokio::test]
async fn client_destroy_closes_server_connections() {
    let server = test_server().await;
    let client = ready_client(&[&server], client_config()).await;
    let mut server_events = server.subscribe();
    assert_eq!(server.connection_count(), 1);

    client.destroy().await;

    next_event(&mut server_events, |e| matches!(e, ServerEvent::Disconnected { .. })).await;
    assert_eq!(server.connection_count(), 0);
    assert!(matches!(client.send_request("a.test", vec![]).await, Err(ClientError::Offline)));
}
