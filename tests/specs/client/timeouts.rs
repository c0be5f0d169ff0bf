//! Request timeout specs

use crate::prelude::*;

async fn slow_server(delay: Duration) -> Server {
    auth_server()
        .proute("a.slow", move |_| async move {
            tokio::time::sleep(delay).await;
            Ok(json!("late"))
        })
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap()
}

#[tokio::test]
async fn call_times_out_at_client_timeout_not_handler_delay() {
    let server = slow_server(Duration::from_millis(1000)).await;
    let client =
        ready_client(&[&server], ClientConfig::load().with_timeout(Duration::from_millis(100)))
            .await;

    let started = Instant::now();
    let err = client.send_request("a.slow", vec![]).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ClientError::Timeout));
    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(900), "{elapsed:?}");
}

#[tokio::test]
async fn late_response_after_timeout_is_ignored() {
    let server = slow_server(Duration::from_millis(200)).await;
    let client =
        ready_client(&[&server], ClientConfig::load().with_timeout(Duration::from_millis(50)))
            .await;
    let mut events = client.subscribe();

    let err = client.send_request("a.slow", vec![]).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
    assert_eq!(client.outstanding(), 0);

    // Let the late response arrive
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(client.outstanding(), 0);
    assert!(client.is_ready());
    assert!(matches!(events.try_recv(), Err(tokio::sync::broadcast::error::TryRecvError::Empty)));
}
