// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-flight requests keyed by id.
//!
//! Each entry is retired exactly once, by whichever of response arrival or
//! timeout gets to it first. The loser finds nothing and does nothing.

use std::collections::HashMap;

use jrpc_wire::RequestId;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::error::ClientError;
use crate::pool::ConnectionId;

pub(crate) type Outcome = Result<Value, ClientError>;

/// A request waiting for its response.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    sink: oneshot::Sender<Outcome>,
    timer: AbortHandle,
    pub connection: ConnectionId,
    pub method: String,
}

impl PendingRequest {
    pub fn new(
        sink: oneshot::Sender<Outcome>,
        timer: AbortHandle,
        connection: ConnectionId,
        method: impl Into<String>,
    ) -> Self {
        Self { sink, timer, connection, method: method.into() }
    }

    /// Disarm the timer and hand the outcome to the caller.
    pub fn resolve(self, outcome: Outcome) {
        self.timer.abort();
        // Caller may have given up on the future
        let _ = self.sink.send(outcome);
    }
}

#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    requests: HashMap<RequestId, PendingRequest>,
}

impl PendingTable {
    pub fn insert(&mut self, id: RequestId, request: PendingRequest) {
        self.requests.insert(id, request);
    }

    pub fn remove(&mut self, id: &RequestId) -> Option<PendingRequest> {
        self.requests.remove(id)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
