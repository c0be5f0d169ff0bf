// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle events.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::Target;

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// The open pool became non-empty (`true`) or empty (`false`).
    Ready { ready: bool },
    /// Transport connected; the handshake follows.
    Connect { target: Target },
    Disconnect { target: Target },
    /// The server rejected the handshake.
    AuthError { target: Target, message: String },
    /// An undecodable line arrived; the connection stays up.
    Error { target: Target, message: String },
}

#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn emit(&self, event: ClientEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }
}
