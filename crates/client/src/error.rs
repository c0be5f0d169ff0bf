// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jrpc_wire::{DecodeError, ProtocolError};
use thiserror::Error;

/// Errors surfaced to callers of the client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A response line could not be decoded.
    #[error("Cannot decode response: {0}")]
    Decode(String),

    /// The server answered with an error string.
    #[error("{0}")]
    Remote(String),

    /// The server rejected the handshake.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Method call did not return within timeout period")]
    Timeout,

    /// No open connection to send on.
    #[error("No connections available")]
    Offline,

    /// The chosen connection went away before the request was written.
    #[error("Connection closed before the request was sent")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid target `{0}` (expected host:port)")]
    InvalidTarget(String),
}

impl ClientError {
    /// Whether this error never touched the wire.
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Offline | ClientError::Disconnected)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(e.to_string())
    }
}

impl From<DecodeError> for ClientError {
    fn from(e: DecodeError) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Json(e) => ClientError::Decode(e.to_string()),
            ProtocolError::Io(e) => ClientError::Io(e.to_string()),
            ProtocolError::ConnectionClosed => ClientError::Disconnected,
            ProtocolError::Timeout => ClientError::Timeout,
        }
    }
}
