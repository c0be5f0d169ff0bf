// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line decoder for `FramedRead`.
//!
//! `FramedRead` ends the stream after the first decoder error, so over-long
//! lines are surfaced as an item instead and the connection keeps reading.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// One unit read off a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Frame(String),
    /// A line longer than the configured maximum was discarded.
    Oversized,
}

#[derive(Debug)]
pub struct LineCodec {
    inner: LinesCodec,
}

impl LineCodec {
    pub fn new(max_line_bytes: usize) -> Self {
        Self { inner: LinesCodec::new_with_max_length(max_line_bytes) }
    }
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Line>, std::io::Error> {
        lift(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Line>, std::io::Error> {
        lift(self.inner.decode_eof(buf))
    }
}

fn lift(
    result: Result<Option<String>, LinesCodecError>,
) -> Result<Option<Line>, std::io::Error> {
    match result {
        Ok(line) => Ok(line.map(Line::Frame)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Line::Oversized)),
        Err(LinesCodecError::Io(e)) => Err(e),
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
