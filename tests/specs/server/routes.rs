//! Route table configuration specs

use crate::prelude::*;

#[test]
fn duplicate_route_is_rejected() {
    let result = open_server()
        .route_sync("a.test", |_| Ok(Value::Null))
        .unwrap()
        .route_sync("a.test", |_| Ok(Value::Null));
    let Err(err) = result else { panic!("duplicate route accepted") };
    assert!(matches!(&err, ConfigError::DuplicateRoute(name) if name == "a.test"));
    assert_eq!(err.to_string(), "Duplicate route name `a.test`");
}

#[test]
fn describing_an_unregistered_route_is_rejected() {
    let result = open_server().describe("a.ghost", "Nothing here", vec![], None);
    assert!(matches!(result, Err(ConfigError::UnknownRoute(name)) if name == "a.ghost"));
}

#[tokio::test]
async fn undescribed_routes_get_default_description() {
    let server = open_server()
        .route_sync("a.plain", |_| Ok(Value::Null))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap();

    let description = server.descriptor().get("a.plain").unwrap();
    assert_eq!(description.description, "No description available.");
    assert!(description.params.is_empty());
}

#[tokio::test]
async fn bind_failure_is_a_config_error() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let result = open_server().listen(taken.local_addr().unwrap()).await;
    assert!(matches!(result, Err(ConfigError::Bind(_))));
}
