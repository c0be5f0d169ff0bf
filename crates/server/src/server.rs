// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration and lifecycle.
//!
//! Routes are registered on a [`ServerBuilder`]. Listening consumes the builder,
//! so the route table is frozen for the whole life of the [`Server`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use jrpc_wire::{ApiDescriptor, ParamSpec, ReturnSpec, RouteDescription};
use parking_lot::Mutex;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ConfigError;
use crate::event::{EventBus, ServerEvent};
use crate::handler::{AuthHandler, Call, Handler, HandlerResult, Responder};
use crate::listener::{Listener, ServeCtx};
use crate::routes::RouteTable;

/// Collects routes and the auth handler before the server starts listening.
#[derive(Debug)]
pub struct ServerBuilder {
    config: ServerConfig,
    routes: RouteTable,
    auth: AuthHandler,
}

impl ServerBuilder {
    pub fn new(config: ServerConfig) -> Self {
        Self { config, routes: RouteTable::default(), auth: AuthHandler::default() }
    }

    /// Register `handler` under a dot-segmented method name.
    pub fn route(mut self, name: &str, handler: Handler) -> Result<Self, ConfigError> {
        self.routes.insert(name, handler)?;
        Ok(self)
    }

    pub fn route_sync<F>(self, name: &str, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(Call) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(name, Handler::sync(f))
    }

    pub fn route_callback<F>(self, name: &str, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(Call, Responder) + Send + Sync + 'static,
    {
        self.route(name, Handler::callback(f))
    }

    /// Register a handler returning a future.
    pub fn proute<F, Fut>(self, name: &str, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(Call) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(name, Handler::future(f))
    }

    /// Attach documentation to an already registered route.
    pub fn describe(
        mut self,
        name: &str,
        text: &str,
        params: Vec<ParamSpec>,
        returns: Option<ReturnSpec>,
    ) -> Result<Self, ConfigError> {
        let mut description = RouteDescription::new(text).with_params(params);
        if let Some(returns) = returns {
            description = description.with_returns(returns);
        }
        self.routes.describe(name, description)?;
        Ok(self)
    }

    pub fn auth(mut self, handler: AuthHandler) -> Self {
        self.auth = handler;
        self
    }

    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.config.require_auth = require_auth;
        self
    }

    /// Bind `addr` and start serving.
    pub async fn listen(self, addr: impl ToSocketAddrs) -> Result<Server, ConfigError> {
        let tcp = TcpListener::bind(addr).await.map_err(ConfigError::Bind)?;
        self.listen_on(tcp)
    }

    /// Start serving on an already bound listener.
    pub fn listen_on(self, tcp: TcpListener) -> Result<Server, ConfigError> {
        let local_addr = tcp.local_addr().map_err(ConfigError::Bind)?;
        let ctx = Arc::new(ServeCtx {
            routes: self.routes.freeze(),
            auth: self.auth,
            config: self.config,
            events: EventBus::new(),
            connections: Mutex::new(HashMap::new()),
        });

        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let listener = Listener::new(tcp, Arc::clone(&ctx), tracker.clone(), cancel.clone());
        tracker.spawn(listener.run());

        info!(
            addr = %local_addr,
            routes = ctx.routes.descriptor().len(),
            require_auth = ctx.config.require_auth,
            "server listening"
        );
        Ok(Server { ctx, local_addr, cancel, tracker })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// A listening server. Dropping it stops the listener and every connection.
pub struct Server {
    ctx: Arc<ServeCtx>,
    local_addr: SocketAddr,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Audit, error and connection events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.ctx.events.subscribe()
    }

    pub fn connection_count(&self) -> usize {
        self.ctx.connections.lock().len()
    }

    pub fn descriptor(&self) -> &ApiDescriptor {
        self.ctx.routes.descriptor()
    }

    /// Stop accepting, close every connection and wait for their tasks.
    pub async fn destroy(self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!(addr = %self.local_addr, "server destroyed");
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.local_addr)
            .field("connections", &self.connection_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
