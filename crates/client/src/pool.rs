// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection pools: one record per configured target, each in exactly one of
//! the pending, open or quarantined states.
//!
//! Pure bookkeeping; sockets and timers live in the session tasks.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use jrpc_wire::RequestId;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::backoff::Backoff;
use crate::config::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ConnectionId(pub usize);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionStatus {
    Pending,
    Open,
    Quarantined,
}

/// Number of connections per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolSizes {
    pub open: usize,
    pub pending: usize,
    pub quarantined: usize,
}

/// Per-connection state owned by the pools.
#[derive(Debug)]
pub(crate) struct ConnectionRecord {
    pub target: Target,
    pub status: ConnectionStatus,
    pub backoff: Backoff,
    /// Line sink of the live socket, if any
    pub writer: Option<mpsc::Sender<String>>,
    /// Requests sent on this connection and not yet retired
    pub outstanding: HashSet<RequestId>,
}

/// Result of moving a connection into quarantine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Quarantined {
    pub target: Target,
    pub delay: Duration,
    /// The open pool just became empty
    pub went_offline: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Pools {
    records: HashMap<ConnectionId, ConnectionRecord>,
    /// Dispatch order for round-robin
    open: Vec<ConnectionId>,
    cursor: usize,
    next_id: usize,
}

impl Pools {
    /// Register a target; it starts pending.
    pub fn add(&mut self, target: Target, backoff: Backoff) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.records.insert(
            id,
            ConnectionRecord {
                target,
                status: ConnectionStatus::Pending,
                backoff,
                writer: None,
                outstanding: HashSet::new(),
            },
        );
        id
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut ConnectionRecord> {
        self.records.get_mut(&id)
    }

    /// Next open connection in round-robin order. The cursor survives pool
    /// changes and wraps when the pool shrank below it.
    pub fn select(&mut self) -> Option<ConnectionId> {
        if self.open.is_empty() {
            return None;
        }
        if self.cursor >= self.open.len() {
            self.cursor = 0;
        }
        let id = self.open[self.cursor];
        self.cursor += 1;
        Some(id)
    }

    /// Pending to open. Returns whether the open pool was empty before, or
    /// `None` when the connection is not pending.
    pub fn promote(&mut self, id: ConnectionId) -> Option<bool> {
        let record = self.records.get_mut(&id)?;
        if record.status != ConnectionStatus::Pending {
            return None;
        }
        record.status = ConnectionStatus::Open;
        record.backoff.reset();
        let became_ready = self.open.is_empty();
        self.open.push(id);
        Some(became_ready)
    }

    /// Pending or open to quarantined. `None` when already quarantined or
    /// unknown.
    pub fn quarantine(&mut self, id: ConnectionId) -> Option<Quarantined> {
        let record = self.records.get_mut(&id)?;
        if record.status == ConnectionStatus::Quarantined {
            return None;
        }
        let was_open = record.status == ConnectionStatus::Open;
        record.status = ConnectionStatus::Quarantined;
        record.writer = None;
        let delay = record.backoff.next_delay();
        let target = record.target.clone();

        let mut went_offline = false;
        if was_open {
            self.open.retain(|open| *open != id);
            went_offline = self.open.is_empty();
        }
        Some(Quarantined { target, delay, went_offline })
    }

    /// Quarantined to pending, ahead of a reconnect attempt.
    pub fn retry(&mut self, id: ConnectionId) -> bool {
        match self.records.get_mut(&id) {
            Some(record) if record.status == ConnectionStatus::Quarantined => {
                record.status = ConnectionStatus::Pending;
                true
            }
            _ => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.open.is_empty()
    }

    pub fn sizes(&self) -> PoolSizes {
        let mut sizes = PoolSizes::default();
        for record in self.records.values() {
            match record.status {
                ConnectionStatus::Pending => sizes.pending += 1,
                ConnectionStatus::Open => sizes.open += 1,
                ConnectionStatus::Quarantined => sizes.quarantined += 1,
            }
        }
        sizes
    }

    /// Drop every record. Returns the targets that were pending or open.
    pub fn clear(&mut self) -> Vec<Target> {
        self.open.clear();
        self.cursor = 0;
        let mut live: Vec<_> = self
            .records
            .drain()
            .filter(|(_, record)| record.status != ConnectionStatus::Quarantined)
            .collect();
        live.sort_by_key(|(id, _)| *id);
        live.into_iter().map(|(_, record)| record.target).collect()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
