// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route descriptor returned to clients by a successful handshake.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Description used for routes nobody described.
pub const UNDOCUMENTED: &str = "No description available.";

/// Every route a server exposes, keyed by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiDescriptor(BTreeMap<String, RouteDescription>);

impl ApiDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: impl Into<String>, description: RouteDescription) {
        self.0.insert(route.into(), description);
    }

    pub fn get(&self, route: &str) -> Option<&RouteDescription> {
        self.0.get(route)
    }

    pub fn contains(&self, route: &str) -> bool {
        self.0.contains_key(route)
    }

    /// Route names in lexical order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteDescription)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, RouteDescription)> for ApiDescriptor {
    fn from_iter<I: IntoIterator<Item = (String, RouteDescription)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Human-readable contract of one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescription {
    pub description: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnSpec>,
}

impl RouteDescription {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), params: Vec::new(), returns: None }
    }

    pub fn undocumented() -> Self {
        Self::new(UNDOCUMENTED)
    }

    pub fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    pub fn with_returns(mut self, returns: ReturnSpec) -> Self {
        self.returns = Some(returns);
        self
    }
}

/// One positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl ParamSpec {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: kind.into(),
            required: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// What a route resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSpec {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ReturnSpec {
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self { description: description.into(), kind: kind.into() }
    }
}
