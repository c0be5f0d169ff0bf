// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and handing
//! each one to its own task. Connection tasks are tracked so `destroy` can
//! wait for them to wind down.

mod connection;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jrpc_wire::ProtocolError;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::ConnectionError;
use crate::event::{ErrorKind, ErrorRecord, EventBus, ServerEvent};
use crate::handler::AuthHandler;
use crate::routes::Routes;

/// Shared server context for all connections.
pub(crate) struct ServeCtx {
    pub routes: Routes,
    pub auth: AuthHandler,
    pub config: ServerConfig,
    pub events: EventBus,
    /// Live connections by id
    pub connections: Mutex<HashMap<u64, SocketAddr>>,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener {
    tcp: TcpListener,
    ctx: Arc<ServeCtx>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl Listener {
    pub fn new(
        tcp: TcpListener,
        ctx: Arc<ServeCtx>,
        tracker: TaskTracker,
        cancel: CancellationToken,
    ) -> Self {
        Self { tcp, ctx, tracker, cancel }
    }

    /// Run the accept loop until cancelled, spawning a task per connection.
    pub async fn run(self) {
        let next_id = AtomicU64::new(0);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("listener stopped");
                    break;
                }
                result = self.tcp.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!("TCP connection from {}", peer);
                            if let Err(e) = stream.set_nodelay(true) {
                                debug!(%peer, error = %e, "failed to set TCP_NODELAY");
                            }
                            let id = next_id.fetch_add(1, Ordering::Relaxed);
                            let ctx = Arc::clone(&self.ctx);
                            let cancel = self.cancel.child_token();
                            self.tracker.spawn(async move {
                                ctx.connections.lock().insert(id, peer);
                                ctx.events.emit(ServerEvent::Connected { peer });

                                let result = connection::handle_connection(
                                    stream,
                                    peer,
                                    Arc::clone(&ctx),
                                    cancel,
                                )
                                .await;
                                if let Err(e) = result {
                                    report_connection_error(&ctx, peer, e);
                                }

                                ctx.connections.lock().remove(&id);
                                ctx.events.emit(ServerEvent::Disconnected { peer });
                            });
                        }
                        Err(e) => error!("TCP accept error: {}", e),
                    }
                }
            }
        }
    }
}

fn report_connection_error(ctx: &ServeCtx, peer: SocketAddr, e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!(%peer, "Client disconnected")
        }
        // Already reported as an auth/validation error event
        ConnectionError::AuthRejected(message) => {
            info!(%peer, "handshake rejected: {}", message)
        }
        ConnectionError::Protocol(e) => {
            warn!(%peer, "Connection error: {}", e);
            ctx.events.emit(ServerEvent::Error(ErrorRecord {
                kind: ErrorKind::Transport,
                message: e.to_string(),
                method: None,
                timings: None,
                context: None,
                id: None,
                peer,
                responded: false,
            }));
        }
    }
}
