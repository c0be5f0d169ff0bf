// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route registration and the frozen lookup table used while serving.

use std::collections::HashMap;

use jrpc_wire::{ApiDescriptor, RouteDescription};

use crate::error::ConfigError;
use crate::handler::Handler;

/// Mutable route table, only reachable through the server builder.
#[derive(Debug, Default)]
pub(crate) struct RouteTable {
    handlers: HashMap<String, Handler>,
    descriptions: HashMap<String, RouteDescription>,
}

impl RouteTable {
    pub fn insert(&mut self, name: &str, handler: Handler) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyRouteName);
        }
        if self.handlers.contains_key(name) {
            return Err(ConfigError::DuplicateRoute(name.to_string()));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn describe(
        &mut self,
        name: &str,
        description: RouteDescription,
    ) -> Result<(), ConfigError> {
        if !self.handlers.contains_key(name) {
            return Err(ConfigError::UnknownRoute(name.to_string()));
        }
        self.descriptions.insert(name.to_string(), description);
        Ok(())
    }

    /// Seal the table. Undescribed routes get the default description.
    pub fn freeze(mut self) -> Routes {
        let descriptor = self
            .handlers
            .keys()
            .map(|name| {
                let description =
                    self.descriptions.remove(name).unwrap_or_else(RouteDescription::undocumented);
                (name.clone(), description)
            })
            .collect();
        Routes { handlers: self.handlers, descriptor }
    }
}

/// Read-only routes of a listening server.
#[derive(Debug)]
pub(crate) struct Routes {
    handlers: HashMap<String, Handler>,
    descriptor: ApiDescriptor,
}

impl Routes {
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn descriptor(&self) -> &ApiDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
