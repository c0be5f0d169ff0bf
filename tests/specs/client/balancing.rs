//! Load balancing specs

use crate::prelude::*;

#[tokio::test]
async fn concurrent_calls_reach_both_servers() {
    let one = adding_server(1).await;
    let two = adding_server(2).await;
    let client = ready_client(&[&one, &two], client_config()).await;
    wait_open(&client, 2).await;

    let (a, b) = tokio::join!(
        client.send_request("a.test", vec![json!(0)]),
        client.send_request("a.test", vec![json!(0)]),
    );
    let mut results = vec![a.unwrap(), b.unwrap()];
    results.sort_by_key(|v| v.as_i64());
    assert_eq!(results, vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn sequential_calls_alternate_deterministically() {
    let one = adding_server(1).await;
    let two = adding_server(2).await;
    let client = ready_client(&[&one, &two], client_config()).await;
    wait_open(&client, 2).await;

    let mut results = Vec::new();
    for _ in 0..6 {
        results.push(client.send_request("a.test", vec![json!(0)]).await.unwrap());
    }
    for pair in results.windows(2) {
        assert_ne!(pair[0], pair[1], "{results:?}");
    }
    assert_eq!(results[0], results[2]);
    assert_eq!(results[1], results[3]);
}
