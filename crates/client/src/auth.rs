// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client side of the auth handshake.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Target;
use crate::error::ClientError;

/// Supplies the material sent in the `auth` frame of every fresh connection.
///
/// Called once per connection attempt, so tokens can be refreshed between
/// reconnects.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    async fn material(&self, target: &Target) -> Result<Value, ClientError>;
}

/// Sends `null` as auth material.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthProvider for NoAuth {
    async fn material(&self, _target: &Target) -> Result<Value, ClientError> {
        Ok(Value::Null)
    }
}

/// Sends the same material to every server.
#[derive(Debug, Clone)]
pub struct StaticAuth(pub Value);

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn material(&self, _target: &Target) -> Result<Value, ClientError> {
        Ok(self.0.clone())
    }
}
