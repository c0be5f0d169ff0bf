// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON RPC client: pooled, load-balanced connections with automatic
//! reconnection, request correlation and generated call stubs.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod auth;
mod backoff;
mod client;
mod config;
mod env;
mod error;
mod event;
mod pending;
mod pool;
mod proxy;
mod session;

pub use auth::{AuthProvider, NoAuth, StaticAuth};
pub use client::Client;
pub use config::{ClientConfig, Target};
pub use error::ClientError;
pub use event::ClientEvent;
pub use pool::PoolSizes;
pub use proxy::{MethodStub, Namespace, Proxy};
