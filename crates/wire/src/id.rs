// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request identifiers used to correlate responses with requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier carried by a request frame and echoed by its response.
///
/// Clients generate [`RequestId::Text`] values holding 32 lowercase hex
/// characters. Integer ids are accepted from foreign peers so a server can echo
/// them back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Text(String),
    Number(i64),
}

impl RequestId {
    /// Generate a fresh random id (128 bits from the OS RNG, hex-encoded).
    ///
    /// Collisions with outstanding ids are not checked.
    pub fn random() -> Self {
        Self::Text(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::Text(s) => Some(s),
            RequestId::Number(_) => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Text(s) => f.write_str(s),
            RequestId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
