// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One task per target: connect, authenticate, read responses, and reconnect
//! with backoff after every failure.

use std::sync::Arc;

use futures_util::{FutureExt, StreamExt};
use jrpc_wire::{decode_line, Line, LineCodec, ResponseFrame, DEFAULT_MAX_LINE_BYTES};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::Shared;
use crate::config::Target;
use crate::error::ClientError;
use crate::event::ClientEvent;
use crate::pool::ConnectionId;

/// Requests queued ahead of the socket writer.
const WRITE_QUEUE: usize = 256;

/// Keep `target` connected until the client is destroyed or dropped.
pub(crate) async fn maintain(shared: Arc<Shared>, conn: ConnectionId, target: Target) {
    let cancel = shared.cancel.clone();
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = run_session(&shared, conn, &target) => result,
        };
        match result {
            Ok(()) => info!(%target, "connection closed"),
            Err(e) => info!(%target, "connection failed: {}", e),
        }

        let Some(delay) = shared.quarantine(conn) else {
            return;
        };
        debug!(%target, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        if !shared.retry(conn) {
            return;
        }
    }
}

/// One socket from connect to close.
async fn run_session(
    shared: &Arc<Shared>,
    conn: ConnectionId,
    target: &Target,
) -> Result<(), ClientError> {
    let stream = TcpStream::connect((target.host.as_str(), target.port)).await?;
    if let Err(e) = stream.set_nodelay(true) {
        debug!(%target, error = %e, "failed to set TCP_NODELAY");
    }
    debug!(%target, "TCP connected");
    shared.events.emit(ClientEvent::Connect { target: target.clone() });

    let (reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::channel(WRITE_QUEUE);
    // Closes the write half whenever this session ends, however it ends
    let stop = CancellationToken::new();
    let _stop = stop.clone().drop_guard();
    tokio::spawn(write_loop(writer, rx, stop));
    shared.attach_writer(conn, tx);

    let mut lines = FramedRead::new(reader, LineCodec::new(DEFAULT_MAX_LINE_BYTES));
    let read = read_loop(shared, target, &mut lines);
    tokio::pin!(read);

    let handshake = async {
        let material = shared.auth.material(target).await?;
        shared.authenticate(conn, material).await
    };
    tokio::pin!(handshake);

    let outcome = tokio::select! {
        biased;
        result = &mut handshake => result,
        result = &mut read => {
            result?;
            // A rejection is written right before the server closes
            match handshake.as_mut().now_or_never() {
                Some(Err(e)) => Err(e),
                _ => return Err(ClientError::Disconnected),
            }
        }
    };
    let api = match outcome {
        Ok(api) => api,
        Err(e) => {
            warn!(%target, "handshake failed: {}", e);
            let message = match e {
                ClientError::Remote(message) | ClientError::Auth(message) => message,
                other => other.to_string(),
            };
            shared.events.emit(ClientEvent::AuthError {
                target: target.clone(),
                message: message.clone(),
            });
            return Err(ClientError::Auth(message));
        }
    };

    info!(%target, routes = api.len(), "connection open");
    shared.promote(conn, api);
    read.await
}

type Lines = FramedRead<OwnedReadHalf, LineCodec>;

/// Deliver responses until the server closes the socket.
async fn read_loop(
    shared: &Arc<Shared>,
    target: &Target,
    lines: &mut Lines,
) -> Result<(), ClientError> {
    while let Some(line) = lines.next().await {
        let message = match line? {
            Line::Frame(text) => match decode_line::<ResponseFrame>(&text) {
                Ok(frame) => {
                    shared.on_response(frame);
                    continue;
                }
                Err(e) => format!("Cannot decode response `{}`: {}", e.line, e.source),
            },
            Line::Oversized => "Response exceeds the maximum line length".to_string(),
        };
        warn!(%target, "{}", message);
        shared.events.emit(ClientEvent::Error { target: target.clone(), message });
    }
    Ok(())
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::Receiver<String>,
    stop: CancellationToken,
) {
    loop {
        let line = tokio::select! {
            _ = stop.cancelled() => break,
            line = rx.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!(error = %e, "request write failed");
            break;
        }
    }
    let _ = writer.shutdown().await;
}
