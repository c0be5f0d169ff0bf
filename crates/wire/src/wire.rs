// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline framing and JSON encoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{AuthFrame, RequestFrame, RequestId};

/// Upper bound on a single frame unless configured otherwise.
pub const DEFAULT_MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Transport-level protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,
}

/// A line that could not be parsed into the expected frame.
#[derive(Debug, Error)]
#[error("Cannot decode `{line}`: {source}")]
pub struct DecodeError {
    pub line: String,
    #[source]
    pub source: serde_json::Error,
}

/// Why an inbound request line was rejected.
#[derive(Debug, Error)]
pub enum RequestErrorKind {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Validation(String),
}

/// A rejected inbound line, with the id when one could be recovered.
///
/// Only errors carrying an id can be answered on the wire.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct RequestError {
    pub id: Option<RequestId>,
    pub kind: RequestErrorKind,
}

impl RequestError {
    fn validation(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self { id, kind: RequestErrorKind::Validation(message.into()) }
    }
}

/// Serialize a frame as a single JSON document followed by `\n`.
pub fn encode_line<T: Serialize>(frame: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}

/// Parse one line into a frame.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, DecodeError> {
    serde_json::from_str(line).map_err(|source| DecodeError { line: line.to_string(), source })
}

/// Parse and validate a method call line.
///
/// The line is parsed to a JSON value first so that the `id` survives a
/// malformed `method` or `params` field.
pub fn decode_request(line: &str) -> Result<RequestFrame, RequestError> {
    let value = parse_value(line)?;
    let id = recover_id(&value);

    let method = match value.get("method") {
        Some(Value::String(method)) if !method.is_empty() => method.clone(),
        _ => return Err(RequestError::validation(id, "Missing `method` property")),
    };
    let params = match value.get("params") {
        Some(Value::Array(params)) => params.clone(),
        _ => {
            return Err(RequestError::validation(
                id,
                "Missing `params` property (expected an array)",
            ))
        }
    };

    Ok(RequestFrame { method, params, id })
}

/// Parse the handshake line of a fresh connection.
///
/// Any shape is accepted as long as the `auth` property is present.
pub fn decode_auth(line: &str) -> Result<AuthFrame, RequestError> {
    let value = parse_value(line)?;
    let id = recover_id(&value);

    match value.get("auth") {
        Some(auth) => Ok(AuthFrame { auth: auth.clone(), id }),
        None => Err(RequestError::validation(
            id,
            "This server requires authentication (the `auth` property is missing).",
        )),
    }
}

fn parse_value(line: &str) -> Result<Value, RequestError> {
    decode_line::<Value>(line).map_err(|e| RequestError { id: None, kind: e.into() })
}

fn recover_id(value: &Value) -> Option<RequestId> {
    match value.get("id")? {
        Value::String(s) => Some(RequestId::Text(s.clone())),
        Value::Number(n) => n.as_i64().map(RequestId::Number),
        _ => None,
    }
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
