// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load-balancing client.
//!
//! One session task per target keeps that target connected. Calls are routed
//! round-robin over open connections and correlated with their responses by
//! id. Pools and the pending table share one lock, never held across `.await`.

use std::sync::{Arc, OnceLock};

use jrpc_wire::{
    encode_line, ApiDescriptor, AuthFrame, ProtocolError, RequestFrame, RequestId, ResponseFrame,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::AbortHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::auth::{AuthProvider, NoAuth};
use crate::backoff::Backoff;
use crate::config::{ClientConfig, Target};
use crate::error::ClientError;
use crate::event::{ClientEvent, EventBus};
use crate::pending::{Outcome, PendingRequest, PendingTable};
use crate::pool::{ConnectionId, PoolSizes, Pools};
use crate::proxy::{ApiTree, Proxy};
use crate::session;

/// Handle to a pool of connections. Cheap to clone; the connections close
/// once every handle is dropped or [`Client::destroy`] is called.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
    _guard: Arc<DropGuard>,
}

pub(crate) struct Shared {
    pub config: ClientConfig,
    pub auth: Arc<dyn AuthProvider>,
    pub events: EventBus,
    pub cancel: CancellationToken,
    state: Mutex<State>,
    ready: watch::Sender<bool>,
    /// Built from the first successful handshake only
    api: OnceLock<Arc<ApiTree>>,
    tracker: TaskTracker,
}

#[derive(Debug, Default)]
struct State {
    pools: Pools,
    pending: PendingTable,
    destroyed: bool,
}

impl Client {
    /// Start connecting to every target with `null` auth material.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(targets: impl IntoIterator<Item = Target>, config: ClientConfig) -> Self {
        Self::connect_with_auth(targets, config, NoAuth)
    }

    pub fn connect_with_auth(
        targets: impl IntoIterator<Item = Target>,
        config: ClientConfig,
        auth: impl AuthProvider,
    ) -> Self {
        let cancel = CancellationToken::new();
        let (ready, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            auth: Arc::new(auth),
            events: EventBus::new(),
            cancel: cancel.clone(),
            state: Mutex::new(State::default()),
            ready,
            api: OnceLock::new(),
            tracker: TaskTracker::new(),
            config,
        });

        for target in targets {
            let backoff = Backoff::from_config(&shared.config);
            let id = shared.state.lock().pools.add(target.clone(), backoff);
            shared.tracker.spawn(session::maintain(Arc::clone(&shared), id, target));
        }

        Self { shared, _guard: Arc::new(cancel.drop_guard()) }
    }

    /// Call `method` on the next open connection and wait for its result.
    pub async fn send_request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, ClientError> {
        let conn = self.shared.state.lock().pools.select().ok_or(ClientError::Offline)?;
        self.shared
            .exchange(conn, method, |id| encode_line(&RequestFrame::new(method, params, id)))
            .await
    }

    /// Callback flavor of [`Client::send_request`]. The callback runs exactly
    /// once, on a runtime task.
    pub fn send_request_with<F>(&self, method: &str, params: Vec<Value>, callback: F)
    where
        F: FnOnce(Result<Value, ClientError>) + Send + 'static,
    {
        let client = self.clone();
        let method = method.to_string();
        tokio::spawn(async move {
            callback(client.send_request(&method, params).await);
        });
    }

    /// Call stubs for the server's routes, once any connection authenticated.
    pub fn proxy(&self) -> Option<Proxy> {
        let tree = self.shared.api.get()?;
        Some(Proxy::from_tree(self.clone(), Arc::clone(tree)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.shared.events.subscribe()
    }

    pub fn pool_sizes(&self) -> PoolSizes {
        self.shared.state.lock().pools.sizes()
    }

    pub fn is_ready(&self) -> bool {
        self.shared.state.lock().pools.is_ready()
    }

    /// Wait until at least one connection is open.
    pub async fn wait_ready(&self) -> Result<(), ClientError> {
        let mut ready = self.shared.ready.subscribe();
        let cancel = self.shared.cancel.clone();
        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Offline),
            result = ready.wait_for(|ready| *ready) => {
                result.map(|_| ()).map_err(|_| ClientError::Offline)
            }
        }
    }

    /// Requests awaiting a response or timeout.
    pub fn outstanding(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Close every connection and stop reconnecting. In-flight calls are left
    /// to their timeouts; later calls fail with [`ClientError::Offline`].
    pub async fn destroy(&self) {
        let (live, was_ready) = {
            let mut state = self.shared.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            let was_ready = state.pools.is_ready();
            (state.pools.clear(), was_ready)
        };
        self.shared.cancel.cancel();

        for target in live {
            self.shared.events.emit(ClientEvent::Disconnect { target });
        }
        if was_ready {
            self.shared.set_ready(false);
        }

        self.shared.tracker.close();
        self.shared.tracker.wait().await;
        info!("client destroyed");
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("pools", &self.pool_sizes()).finish()
    }
}

impl Shared {
    /// Write one correlated frame on `conn` and wait for its outcome.
    pub async fn exchange<F>(
        self: &Arc<Self>,
        conn: ConnectionId,
        method: &str,
        frame: F,
    ) -> Result<Value, ClientError>
    where
        F: FnOnce(RequestId) -> Result<String, ProtocolError>,
    {
        let id = RequestId::random();
        let line = frame(id.clone())?;
        let (sink, outcome) = oneshot::channel();

        let writer = {
            let mut state = self.state.lock();
            let State { pools, pending, .. } = &mut *state;
            let record = pools.get_mut(conn).ok_or(ClientError::Offline)?;
            let writer = record.writer.clone().ok_or(ClientError::Disconnected)?;
            record.outstanding.insert(id.clone());
            // Armed under the lock so the timer cannot fire before the entry exists
            let timer = self.arm_timeout(id.clone());
            pending.insert(id.clone(), PendingRequest::new(sink, timer, conn, method));
            writer
        };

        debug!(%conn, %id, method, "sending request");
        if writer.send(line).await.is_err() {
            self.retire(&id, Err(ClientError::Disconnected));
        }
        outcome.await.unwrap_or(Err(ClientError::Disconnected))
    }

    /// Send the handshake on a fresh connection.
    pub async fn authenticate(
        self: &Arc<Self>,
        conn: ConnectionId,
        material: Value,
    ) -> Result<ApiDescriptor, ClientError> {
        let result = self
            .exchange(conn, "auth", |id| encode_line(&AuthFrame { auth: material, id: Some(id) }))
            .await?;
        let reply: jrpc_wire::HandshakeResult =
            serde_json::from_value(result).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(reply.api)
    }

    fn arm_timeout(self: &Arc<Self>, id: RequestId) -> AbortHandle {
        let shared = Arc::downgrade(self);
        let timeout = self.config.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(shared) = shared.upgrade() {
                shared.retire(&id, Err(ClientError::Timeout));
            }
        })
        .abort_handle()
    }

    /// Remove a pending request from every map and resolve it. Returns false
    /// when it was already retired.
    pub fn retire(&self, id: &RequestId, outcome: Outcome) -> bool {
        let request = {
            let mut state = self.state.lock();
            let Some(request) = state.pending.remove(id) else {
                return false;
            };
            if let Some(record) = state.pools.get_mut(request.connection) {
                record.outstanding.remove(id);
            }
            request
        };
        if matches!(outcome, Err(ClientError::Timeout)) {
            debug!(%id, conn = %request.connection, method = %request.method, "request timed out");
        }
        request.resolve(outcome);
        true
    }

    /// Route a response line to its waiting caller.
    pub fn on_response(&self, frame: ResponseFrame) {
        let Some(id) = frame.id.clone() else {
            debug!("ignoring response without id");
            return;
        };
        let outcome = frame.into_result().map_err(ClientError::Remote);
        if !self.retire(&id, outcome) {
            debug!(%id, "ignoring response for unknown request");
        }
    }

    pub fn attach_writer(&self, conn: ConnectionId, writer: tokio::sync::mpsc::Sender<String>) {
        if let Some(record) = self.state.lock().pools.get_mut(conn) {
            record.writer = Some(writer);
        }
    }

    /// A handshake succeeded: open the connection.
    pub fn promote(&self, conn: ConnectionId, api: ApiDescriptor) {
        self.api.get_or_init(|| Arc::new(ApiTree::build(api)));
        let became_ready = self.state.lock().pools.promote(conn);
        if became_ready == Some(true) {
            self.set_ready(true);
        }
    }

    /// The connection closed or failed. Returns the delay before the next
    /// attempt, or `None` when the client is gone.
    pub fn quarantine(&self, conn: ConnectionId) -> Option<std::time::Duration> {
        let quarantined = {
            let mut state = self.state.lock();
            if state.destroyed {
                return None;
            }
            state.pools.quarantine(conn)?
        };
        self.events.emit(ClientEvent::Disconnect { target: quarantined.target });
        if quarantined.went_offline {
            self.set_ready(false);
        }
        Some(quarantined.delay)
    }

    pub fn retry(&self, conn: ConnectionId) -> bool {
        let mut state = self.state.lock();
        !state.destroyed && state.pools.retry(conn)
    }

    fn set_ready(&self, ready: bool) {
        info!(ready, "client readiness changed");
        self.ready.send_replace(ready);
        self.events.emit(ClientEvent::Ready { ready });
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
