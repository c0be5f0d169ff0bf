//! Shared helpers for the jrpc specs.

#![allow(dead_code, unused_imports)]

pub use std::time::{Duration, Instant};

pub use jrpc_client::{
    Client, ClientConfig, ClientError, ClientEvent, PoolSizes, StaticAuth, Target,
};
pub use jrpc_server::{
    AuthHandler, ConfigError, ErrorKind, HandlerError, ParamSpec, ReturnSpec, Server,
    ServerBuilder, ServerConfig, ServerEvent,
};
pub use serde_json::{json, Value};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::broadcast;

/// Upper bound on anything a spec waits for.
pub const SPEC_WAIT: Duration = Duration::from_secs(5);

/// Install a test-friendly subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn auth_server() -> ServerBuilder {
    init_tracing();
    ServerBuilder::new(ServerConfig::load().with_require_auth(true)).auth(AuthHandler::allow_all())
}

pub fn open_server() -> ServerBuilder {
    init_tracing();
    ServerBuilder::new(ServerConfig::load().with_require_auth(false))
}

/// The classic pair: `a.test(s) -> s + "1"` and `a.error() -> "Nope"`.
pub async fn test_server() -> Server {
    auth_server()
        .route_callback("a.test", |call, responder| match call.param::<String>(0) {
            Ok(s) => responder.ok(format!("{s}1")),
            Err(e) => responder.err(e),
        })
        .unwrap()
        .route_sync("a.error", |_| Err(HandlerError::new("Nope")))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap()
}

/// `a.test(n) -> n + k`
pub async fn adding_server(k: i64) -> Server {
    auth_server()
        .route_sync("a.test", move |call| Ok(json!(call.param::<i64>(0)? + k)))
        .unwrap()
        .listen("127.0.0.1:0")
        .await
        .unwrap()
}

pub fn client_config() -> ClientConfig {
    ClientConfig::load().with_timeout(SPEC_WAIT)
}

/// Connect to every server and wait until at least one connection is open.
pub async fn ready_client(servers: &[&Server], config: ClientConfig) -> Client {
    let client = Client::connect(servers.iter().map(|s| Target::from(s.local_addr())), config);
    tokio::time::timeout(SPEC_WAIT, client.wait_ready()).await.unwrap().unwrap();
    client
}

/// Wait until `client` has `n` open connections.
pub async fn wait_open(client: &Client, n: usize) {
    tokio::time::timeout(SPEC_WAIT, async {
        while client.pool_sizes().open < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

/// Next event matching `pred`, skipping the rest.
pub async fn next_event<T, F>(events: &mut broadcast::Receiver<T>, pred: F) -> T
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    tokio::time::timeout(SPEC_WAIT, async {
        loop {
            let event = events.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .unwrap()
}

/// A bare TCP peer speaking raw lines.
pub struct RawPeer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl RawPeer {
    pub async fn connect(server: &Server) -> Self {
        let stream = TcpStream::connect(server.local_addr()).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self { lines: BufReader::new(reader).lines(), writer }
    }

    pub async fn send(&mut self, value: &Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    /// Next response, or `None` once the server closed the socket.
    pub async fn recv(&mut self) -> Option<Value> {
        let line = tokio::time::timeout(SPEC_WAIT, self.lines.next_line()).await.unwrap().unwrap()?;
        Some(serde_json::from_str(&line).unwrap())
    }
}
