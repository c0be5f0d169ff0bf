// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frames exchanged over a connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiDescriptor, RequestId};

/// Method call from client to server.
///
/// A frame without `id` is fire-and-forget: the server never answers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub method: String,
    pub params: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl RequestFrame {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: RequestId) -> Self {
        Self { method: method.into(), params, id: Some(id) }
    }

    /// Build a frame the server must not respond to.
    pub fn notification(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self { method: method.into(), params, id: None }
    }
}

/// Handshake frame, always the first line a client sends on a fresh connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthFrame {
    pub auth: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

/// Successful handshake result: the server's route descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeResult {
    pub api: ApiDescriptor,
}

/// Server reply. Exactly one of `result`/`error` is meaningful: `error` is
/// `null` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl ResponseFrame {
    pub fn ok(id: Option<RequestId>, result: Value) -> Self {
        Self { result, error: None, id }
    }

    pub fn err(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self { result: Value::Null, error: Some(message.into()), id }
    }

    /// Collapse into the caller-facing outcome.
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.result),
        }
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
