// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One client connection: handshake, then concurrent dispatch of every line.
//!
//! Handlers run in a per-connection `JoinSet`; responses are funneled through a
//! single writer task so concurrent completions never interleave bytes. When
//! the socket closes, the server stops, or the writer gives up, the set is
//! dropped and in-flight handlers are aborted without a response.

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{FutureExt, StreamExt};
use jrpc_wire::{
    decode_auth, decode_request, encode_line, HandshakeResult, Line, LineCodec, ProtocolError,
    RequestErrorKind, RequestId, ResponseFrame, Stopwatch,
};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ServeCtx;
use crate::error::{ConnectionError, HandlerError};
use crate::event::{AuditRecord, ErrorKind, ErrorRecord, ServerEvent};
use crate::handler::{AuthContext, Call, Handler, HandlerResult};

/// Timing phase names
const PARSE: &str = "parse";
const AUTH: &str = "auth";
const PROCESS: &str = "process";
const ERROR: &str = "error";

/// Responses queued ahead of the writer before handlers start waiting.
const WRITE_QUEUE: usize = 256;

const OVERSIZED: &str = "Frame exceeds the maximum line length";

type Lines = FramedRead<tokio::net::tcp::OwnedReadHalf, LineCodec>;

/// Handle a single client connection until it closes or the server stops.
pub(super) async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Arc<ServeCtx>,
    cancel: CancellationToken,
) -> Result<(), ConnectionError> {
    let (reader, writer) = stream.into_split();
    let mut lines = FramedRead::new(reader, LineCodec::new(ctx.config.max_line_bytes));

    // Cancelled by the server or by the writer once it can no longer deliver
    let closed = cancel.child_token();
    let (tx, rx) = mpsc::channel(WRITE_QUEUE);
    let writer_task =
        tokio::spawn(write_loop(writer, rx, ctx.config.write_timeout, peer, closed.clone()));

    let outbox = Outbox { tx, peer, ctx };
    let result = serve(&mut lines, outbox, &closed).await;

    // All senders are gone once `serve` returns; wait for queued responses
    // (e.g. a handshake rejection) to be flushed before the socket closes.
    let _ = writer_task.await;
    result
}

async fn serve(
    lines: &mut Lines,
    outbox: Outbox,
    cancel: &CancellationToken,
) -> Result<(), ConnectionError> {
    let context = if outbox.ctx.config.require_auth {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            next = lines.next() => next,
        };
        match next {
            None => return Ok(()),
            Some(line) => {
                let line = line.map_err(ProtocolError::from)?;
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    context = handshake(line, Instant::now(), &outbox) => context?,
                }
            }
        }
    } else {
        AuthContext::anonymous()
    };

    let mut inflight = JoinSet::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(_) = inflight.join_next(), if !inflight.is_empty() => {}
            next = lines.next() => {
                let received = Instant::now();
                match next {
                    None => break,
                    Some(Err(e)) => return Err(ProtocolError::from(e).into()),
                    Some(Ok(line)) => {
                        inflight.spawn(dispatch(line, received, context.clone(), outbox.clone()));
                    }
                }
            }
        }
    }
    if !inflight.is_empty() {
        debug!(peer = %outbox.peer, count = inflight.len(), "dropping in-flight requests");
    }
    Ok(())
}

/// Run the auth handler on the first line of a fresh connection.
async fn handshake(
    line: Line,
    received: Instant,
    outbox: &Outbox,
) -> Result<AuthContext, ConnectionError> {
    let mut watch = Stopwatch::started_at(received);
    let frame = match line {
        Line::Frame(text) => decode_auth(&text),
        Line::Oversized => {
            watch.mark(PARSE);
            let failure = Failure::new(ErrorKind::Decode, OVERSIZED);
            outbox.fail(failure, watch, true).await;
            return Err(ConnectionError::AuthRejected(OVERSIZED.to_string()));
        }
    };
    watch.mark(PARSE);

    let frame = match frame {
        Ok(frame) => frame,
        Err(e) => {
            let failure = Failure::new(request_error_kind(&e.kind), e.to_string()).with_id(e.id);
            let message = failure.message.clone();
            outbox.fail(failure, watch, true).await;
            return Err(ConnectionError::AuthRejected(message));
        }
    };

    let authenticated = outbox.ctx.auth.authenticate(frame.auth).await;
    watch.mark(AUTH);

    match authenticated {
        Ok(context) => {
            let reply = HandshakeResult { api: outbox.ctx.routes.descriptor().clone() };
            let result = serde_json::to_value(reply).map_err(ProtocolError::from)?;
            outbox.send(&ResponseFrame::ok(frame.id, result)).await;
            watch.mark(PROCESS);
            info!(peer = %outbox.peer, total_us = watch.finish().total, "handshake accepted");
            Ok(context)
        }
        Err(e) => {
            let failure = Failure::new(ErrorKind::Auth, e.message()).with_id(frame.id);
            outbox.fail(failure, watch, true).await;
            Err(ConnectionError::AuthRejected(e.message().to_string()))
        }
    }
}

/// Execute one request line and answer it when it carries an id.
async fn dispatch(line: Line, received: Instant, context: AuthContext, outbox: Outbox) {
    let mut watch = Stopwatch::started_at(received);
    let decoded = match &line {
        Line::Frame(text) => decode_request(text),
        Line::Oversized => {
            watch.mark(PARSE);
            outbox.fail(Failure::new(ErrorKind::Decode, OVERSIZED), watch, false).await;
            return;
        }
    };
    watch.mark(PARSE);

    let frame = match decoded {
        Ok(frame) => frame,
        Err(e) => {
            let respond = e.id.is_some();
            let failure = Failure::new(request_error_kind(&e.kind), e.to_string())
                .with_id(e.id)
                .with_context(context);
            outbox.fail(failure, watch, respond).await;
            return;
        }
    };

    let Some(handler) = outbox.ctx.routes.get(&frame.method).cloned() else {
        let respond = frame.id.is_some();
        let failure =
            Failure::new(ErrorKind::Validation, format!("Unknown method `{}`", frame.method))
                .with_id(frame.id)
                .with_method(frame.method)
                .with_context(context);
        outbox.fail(failure, watch, respond).await;
        return;
    };

    debug!(peer = %outbox.peer, method = %frame.method, id = ?frame.id, "dispatching");
    let call = Call {
        method: frame.method.clone(),
        params: frame.params.clone(),
        context: context.clone(),
    };

    match run_handler(&handler, call).await {
        Ok(result) => {
            watch.mark(PROCESS);
            if let Some(id) = &frame.id {
                outbox.send(&ResponseFrame::ok(Some(id.clone()), result.clone())).await;
            }
            outbox.ctx.events.emit(ServerEvent::Audit(AuditRecord {
                method: frame.method,
                params: frame.params,
                result,
                timings: watch.finish(),
                context,
                id: frame.id,
                peer: outbox.peer,
            }));
        }
        Err(e) => {
            let respond = frame.id.is_some();
            let failure = Failure::new(ErrorKind::Handler, e.message())
                .with_id(frame.id)
                .with_method(frame.method)
                .with_context(context);
            outbox.fail(failure, watch, respond).await;
        }
    }
}

/// Invoke a handler, turning a panic into an ordinary failure.
async fn run_handler(handler: &Handler, call: Call) -> HandlerResult {
    AssertUnwindSafe(handler.invoke(call))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(HandlerError::new("Handler panicked")))
}

fn request_error_kind(kind: &RequestErrorKind) -> ErrorKind {
    match kind {
        RequestErrorKind::Decode(_) => ErrorKind::Decode,
        RequestErrorKind::Validation(_) => ErrorKind::Validation,
    }
}

/// Details of a failed request, before timings are attached.
struct Failure {
    kind: ErrorKind,
    message: String,
    id: Option<RequestId>,
    method: Option<String>,
    context: Option<AuthContext>,
}

impl Failure {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), id: None, method: None, context: None }
    }

    fn with_id(mut self, id: Option<RequestId>) -> Self {
        self.id = id;
        self
    }

    fn with_method(mut self, method: String) -> Self {
        self.method = Some(method);
        self
    }

    fn with_context(mut self, context: AuthContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Response path of one connection plus the shared server context.
#[derive(Clone)]
struct Outbox {
    tx: mpsc::Sender<String>,
    peer: SocketAddr,
    ctx: Arc<ServeCtx>,
}

impl Outbox {
    /// Queue a response frame. Returns false when the connection is gone.
    async fn send(&self, frame: &ResponseFrame) -> bool {
        match encode_line(frame) {
            Ok(line) => self.tx.send(line).await.is_ok(),
            Err(e) => {
                warn!(peer = %self.peer, error = %e, "failed to encode response");
                false
            }
        }
    }

    /// Close the request with the `error` phase, answer it if asked to, and
    /// emit the error event.
    async fn fail(&self, failure: Failure, mut watch: Stopwatch, respond: bool) {
        watch.mark(ERROR);
        let responded = respond
            && self.send(&ResponseFrame::err(failure.id.clone(), failure.message.clone())).await;

        debug!(
            peer = %self.peer,
            kind = ?failure.kind,
            method = ?failure.method,
            id = ?failure.id,
            responded,
            "request failed: {}",
            failure.message
        );

        self.ctx.events.emit(ServerEvent::Error(ErrorRecord {
            kind: failure.kind,
            message: failure.message,
            method: failure.method,
            timings: Some(watch.finish()),
            context: failure.context,
            id: failure.id,
            peer: self.peer,
            responded,
        }));
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::Receiver<String>,
    write_timeout: Duration,
    peer: SocketAddr,
    closed: CancellationToken,
) {
    let _closed = closed.drop_guard();
    while let Some(line) = rx.recv().await {
        match tokio::time::timeout(write_timeout, writer.write_all(line.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(%peer, error = %e, "response write failed");
                break;
            }
            Err(_) => {
                warn!(%peer, "response write timed out");
                break;
            }
        }
    }
    let _ = writer.shutdown().await;
}
