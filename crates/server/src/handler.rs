// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route and auth handlers.
//!
//! The invocation style is chosen once, at registration, by picking a variant:
//! a plain function returning its result, a function that completes a
//! [`Responder`] later, or a function returning a future. Every style is
//! normalized to a single async completion by [`Handler::invoke`].

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::HandlerError;

pub type HandlerResult = Result<Value, HandlerError>;

type SyncFn = dyn Fn(Call) -> HandlerResult + Send + Sync;
type CallbackFn = dyn Fn(Call, Responder) + Send + Sync;
type FutureFn = dyn Fn(Call) -> BoxFuture<'static, HandlerResult> + Send + Sync;

type AuthSyncFn = dyn Fn(Value) -> HandlerResult + Send + Sync;
type AuthCallbackFn = dyn Fn(Value, Responder) + Send + Sync;
type AuthFutureFn = dyn Fn(Value) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// Value produced by the auth handler and attached to a connection for its
/// whole life. Never mutated after the handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext(Arc<Value>);

impl Serialize for AuthContext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl AuthContext {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// Context of connections on servers that skip the handshake.
    pub fn anonymous() -> Self {
        Self::new(Value::Null)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// Arguments of one method call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub params: Vec<Value>,
    pub context: AuthContext,
}

impl Call {
    /// Deserialize the positional parameter at `index`.
    pub fn param<T: DeserializeOwned>(&self, index: usize) -> Result<T, HandlerError> {
        let value = self
            .params
            .get(index)
            .ok_or_else(|| HandlerError::new(format!("Missing parameter {index}")))?;
        serde_json::from_value(value.clone())
            .map_err(|e| HandlerError::new(format!("Invalid parameter {index}: {e}")))
    }
}

/// Single-use completion handle given to callback-style handlers.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<HandlerResult>,
}

impl Responder {
    pub(crate) fn new() -> (Self, oneshot::Receiver<HandlerResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn complete(self, result: HandlerResult) {
        // Receiver is gone when the connection closed first
        let _ = self.tx.send(result);
    }

    pub fn ok(self, value: impl Into<Value>) {
        self.complete(Ok(value.into()));
    }

    pub fn err(self, error: impl Into<HandlerError>) {
        self.complete(Err(error.into()));
    }
}

async fn await_responder(rx: oneshot::Receiver<HandlerResult>) -> HandlerResult {
    rx.await.unwrap_or_else(|_| Err(HandlerError::new("Handler dropped its responder")))
}

/// A registered route implementation.
#[derive(Clone)]
pub enum Handler {
    Sync(Arc<SyncFn>),
    Callback(Arc<CallbackFn>),
    Future(Arc<FutureFn>),
}

impl Handler {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Call) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Sync(Arc::new(f))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Call, Responder) + Send + Sync + 'static,
    {
        Handler::Callback(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Call) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler::Future(Arc::new(move |call| Box::pin(f(call))))
    }

    pub async fn invoke(&self, call: Call) -> HandlerResult {
        match self {
            Handler::Sync(f) => f(call),
            Handler::Callback(f) => {
                let (responder, rx) = Responder::new();
                f(call, responder);
                await_responder(rx).await
            }
            Handler::Future(f) => f(call).await,
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let style = match self {
            Handler::Sync(_) => "Sync",
            Handler::Callback(_) => "Callback",
            Handler::Future(_) => "Future",
        };
        write!(f, "Handler::{style}")
    }
}

/// Validates handshake material and produces the connection's context.
#[derive(Clone)]
pub enum AuthHandler {
    Sync(Arc<AuthSyncFn>),
    Callback(Arc<AuthCallbackFn>),
    Future(Arc<AuthFutureFn>),
}

impl AuthHandler {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Value) -> HandlerResult + Send + Sync + 'static,
    {
        AuthHandler::Sync(Arc::new(f))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Value, Responder) + Send + Sync + 'static,
    {
        AuthHandler::Callback(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        AuthHandler::Future(Arc::new(move |material| Box::pin(f(material))))
    }

    /// Accept every client, using the handshake material as context.
    pub fn allow_all() -> Self {
        AuthHandler::sync(Ok)
    }

    pub async fn authenticate(&self, material: Value) -> Result<AuthContext, HandlerError> {
        let value = match self {
            AuthHandler::Sync(f) => f(material),
            AuthHandler::Callback(f) => {
                let (responder, rx) = Responder::new();
                f(material, responder);
                await_responder(rx).await
            }
            AuthHandler::Future(f) => f(material).await,
        }?;
        Ok(AuthContext::new(value))
    }
}

impl std::fmt::Debug for AuthHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let style = match self {
            AuthHandler::Sync(_) => "Sync",
            AuthHandler::Callback(_) => "Callback",
            AuthHandler::Future(_) => "Future",
        };
        write!(f, "AuthHandler::{style}")
    }
}

impl Default for AuthHandler {
    /// Rejects everyone until a real handler is configured.
    fn default() -> Self {
        AuthHandler::sync(|_| Err(HandlerError::new("Missing authentication handler")))
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
