// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the client crate.

use std::time::Duration;

fn millis(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Per-request timeout (default 10s)
pub fn timeout() -> Duration {
    millis("JRPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(10))
}

/// Reconnect delay after the first immediate retry (default 100ms)
pub fn retry_floor() -> Duration {
    millis("JRPC_RETRY_FLOOR_MS").unwrap_or(Duration::from_millis(100))
}

/// Upper bound on the reconnect delay (default 30s)
pub fn retry_max() -> Duration {
    millis("JRPC_RETRY_MAX_MS").unwrap_or(Duration::from_secs(30))
}
