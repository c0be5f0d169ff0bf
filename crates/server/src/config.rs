// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Route the first line of every connection to the auth handler
    pub require_auth: bool,
    /// Bound on writing a single response
    pub write_timeout: Duration,
    /// Longest accepted request line
    pub max_line_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn load() -> Self {
        Self {
            require_auth: env::require_auth(),
            write_timeout: env::write_timeout(),
            max_line_bytes: env::max_line_bytes(),
        }
    }

    pub fn with_require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::load()
    }
}
