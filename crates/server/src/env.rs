// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the server crate.

use std::time::Duration;

use jrpc_wire::DEFAULT_MAX_LINE_BYTES;

/// Whether fresh connections must complete the auth handshake first.
/// `JRPC_REQUIRE_AUTH=0` (or `false`) disables it.
pub fn require_auth() -> bool {
    match std::env::var("JRPC_REQUIRE_AUTH") {
        Ok(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
        Err(_) => true,
    }
}

/// Bound on a single response write (default 5s)
pub fn write_timeout() -> Duration {
    std::env::var("JRPC_WRITE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Longest accepted request line in bytes
pub fn max_line_bytes() -> usize {
    std::env::var("JRPC_MAX_LINE_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_LINE_BYTES)
}
