// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Call stubs generated from a server's route descriptor.
//!
//! Route names are dot-segmented; `a.b.c` is reachable as
//! `proxy.namespace("a")?.namespace("b")?.method("c")` or directly as
//! `proxy.method("a.b.c")`. A segment may be both a method and a namespace.

use std::collections::BTreeMap;
use std::sync::Arc;

use jrpc_wire::ApiDescriptor;
use serde_json::Value;

use crate::client::Client;
use crate::error::ClientError;

/// Namespace tree plus the descriptor it was built from.
#[derive(Debug)]
pub(crate) struct ApiTree {
    descriptor: ApiDescriptor,
    root: Node,
}

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    /// Fully-qualified route name when this segment is callable
    route: Option<String>,
}

impl ApiTree {
    pub fn build(descriptor: ApiDescriptor) -> Self {
        let mut root = Node::default();
        for route in descriptor.routes() {
            let mut node = &mut root;
            for segment in route.split('.') {
                node = node.children.entry(segment.to_string()).or_default();
            }
            node.route = Some(route.to_string());
        }
        Self { descriptor, root }
    }

    fn find(&self, path: &str) -> Option<&Node> {
        path.split('.').try_fold(&self.root, |node, segment| node.children.get(segment))
    }
}

/// Typed view of the routes a server exposes.
#[derive(Debug, Clone)]
pub struct Proxy {
    client: Client,
    tree: Arc<ApiTree>,
}

impl Proxy {
    /// Build stubs over `descriptor` bound to `client`.
    pub fn build(client: &Client, descriptor: ApiDescriptor) -> Self {
        Self::from_tree(client.clone(), Arc::new(ApiTree::build(descriptor)))
    }

    pub(crate) fn from_tree(client: Client, tree: Arc<ApiTree>) -> Self {
        Self { client, tree }
    }

    /// Namespace at a (possibly dotted) path.
    pub fn namespace(&self, path: &str) -> Option<Namespace<'_>> {
        let node = self.tree.find(path)?;
        if node.children.is_empty() {
            return None;
        }
        Some(Namespace { client: &self.client, node })
    }

    /// Stub for a fully-qualified route name.
    pub fn method(&self, route: &str) -> Option<MethodStub> {
        let route = self.tree.find(route)?.route.as_ref()?;
        Some(MethodStub::new(&self.client, route))
    }

    /// Fully-qualified names of every route.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.tree.descriptor.routes()
    }

    pub fn descriptor(&self) -> &ApiDescriptor {
        &self.tree.descriptor
    }
}

/// One level of the namespace tree.
#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a> {
    client: &'a Client,
    node: &'a Node,
}

impl<'a> Namespace<'a> {
    pub fn namespace(&self, segment: &str) -> Option<Namespace<'a>> {
        let node = self.node.children.get(segment)?;
        if node.children.is_empty() {
            return None;
        }
        Some(Namespace { client: self.client, node })
    }

    pub fn method(&self, segment: &str) -> Option<MethodStub> {
        let route = self.node.children.get(segment)?.route.as_ref()?;
        Some(MethodStub::new(self.client, route))
    }

    /// Names directly below this level.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        self.node.children.keys().map(String::as_str)
    }
}

/// Calls one route through the client's load balancer.
#[derive(Debug, Clone)]
pub struct MethodStub {
    client: Client,
    route: String,
}

impl MethodStub {
    fn new(client: &Client, route: &str) -> Self {
        Self { client: client.clone(), route: route.to_string() }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub async fn call(&self, params: Vec<Value>) -> Result<Value, ClientError> {
        self.client.send_request(&self.route, params).await
    }

    /// Callback flavor of [`MethodStub::call`]; the callback runs exactly once.
    pub fn call_with<F>(&self, params: Vec<Value>, callback: F)
    where
        F: FnOnce(Result<Value, ClientError>) + Send + 'static,
    {
        self.client.send_request_with(&self.route, params, callback);
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
