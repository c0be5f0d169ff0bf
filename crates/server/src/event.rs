// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band operational events.
//!
//! Audit and error records are emitted whether or not a response was written,
//! so fire-and-forget calls stay visible.

use std::net::SocketAddr;

use jrpc_wire::{RequestId, Timings};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::handler::AuthContext;

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected { peer: SocketAddr },
    Disconnected { peer: SocketAddr },
    Audit(AuditRecord),
    Error(ErrorRecord),
}

/// A request that completed successfully.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub method: String,
    pub params: Vec<Value>,
    pub result: Value,
    pub timings: Timings,
    pub context: AuthContext,
    pub id: Option<RequestId>,
    pub peer: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The line was not valid JSON or exceeded the line limit.
    Decode,
    /// Missing or malformed `method`, `params` or `auth`; unknown method.
    Validation,
    /// The auth handler rejected the handshake.
    Auth,
    /// A route handler failed.
    Handler,
    /// The connection itself failed.
    Transport,
}

/// A request or connection that failed.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub method: Option<String>,
    pub timings: Option<Timings>,
    pub context: Option<AuthContext>,
    pub id: Option<RequestId>,
    pub peer: SocketAddr,
    /// Whether an error frame was written back.
    pub responded: bool,
}

/// Fan-out of server events to any number of subscribers.
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn emit(&self, event: ServerEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}
