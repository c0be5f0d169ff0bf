// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-delimited JSON RPC protocol.
//!
//! Wire format: one UTF-8 JSON document per line, terminated by a single `\n`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod descriptor;
mod frame;
mod id;
mod timing;
mod wire;

pub use codec::{Line, LineCodec};
pub use descriptor::{
    ApiDescriptor, ParamSpec, ReturnSpec, RouteDescription, UNDOCUMENTED,
};
pub use frame::{AuthFrame, HandshakeResult, RequestFrame, ResponseFrame};
pub use id::RequestId;
pub use timing::{Step, Stopwatch, Timings};
pub use wire::{
    decode_auth, decode_line, decode_request, encode_line, DecodeError, ProtocolError,
    RequestError, RequestErrorKind, DEFAULT_MAX_LINE_BYTES,
};
