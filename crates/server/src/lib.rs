// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON RPC server: route table, auth handshake and dispatch engine.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod env;
mod error;
mod event;
mod handler;
mod listener;
mod routes;
mod server;

pub use config::ServerConfig;
pub use error::{ConfigError, HandlerError};
pub use event::{AuditRecord, ErrorKind, ErrorRecord, ServerEvent};
pub use handler::{AuthContext, AuthHandler, Call, Handler, HandlerResult, Responder};
pub use jrpc_wire::{ApiDescriptor, ParamSpec, ReturnSpec, RouteDescription};
pub use server::{Server, ServerBuilder};
