// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::env;
use crate::error::ClientError;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long a call waits for its response
    pub timeout: Duration,
    /// Reconnect delay after the first, immediate, retry
    pub retry_floor: Duration,
    /// Growth of the reconnect delay per consecutive failure
    pub retry_factor: f64,
    /// Reconnect delay never grows past this
    pub retry_max: Duration,
}

impl ClientConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn load() -> Self {
        Self {
            timeout: env::timeout(),
            retry_floor: env::retry_floor(),
            retry_factor: 1.5,
            retry_max: env::retry_max(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_floor(mut self, retry_floor: Duration) -> Self {
        self.retry_floor = retry_floor;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::load()
    }
}

/// A server address the client keeps a connection to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Target {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) =
            s.rsplit_once(':').ok_or_else(|| ClientError::InvalidTarget(s.to_string()))?;
        let port = port.parse::<u16>().map_err(|_| ClientError::InvalidTarget(s.to_string()))?;
        if host.is_empty() {
            return Err(ClientError::InvalidTarget(s.to_string()));
        }
        Ok(Self::new(host, port))
    }
}

impl From<std::net::SocketAddr> for Target {
    fn from(addr: std::net::SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
