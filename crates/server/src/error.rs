// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use jrpc_wire::ProtocolError;
use thiserror::Error;

/// Server misconfiguration, detected before any connection is served.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Duplicate route name `{0}`")]
    DuplicateRoute(String),

    #[error("Route names must not be empty")]
    EmptyRouteName,

    #[error("Cannot describe unknown route `{0}`")]
    UnknownRoute(String),

    #[error("Failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
}

/// Failure reported by a route or auth handler.
///
/// Only the message travels back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Errors that end a single connection.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Handshake rejected: {0}")]
    AuthRejected(String),
}
