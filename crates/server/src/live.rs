// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-session change streaming over WebSocket.
//!
//! Messages only announce that a newer version exists. Clients fetch the
//! session over HTTP to see what changed, and keep polling the version
//! endpoint as a fallback for anything this channel misses.
//!
//! # Architecture
//!
//! - One subscription per connection, scoped to a single session key
//! - Commands are never accepted over the socket
//! - A ping is sent every heartbeat; a connection that did not answer the
//!   previous ping is closed
//! - The subscription is released when the connection ends

use axum::{
    body::Bytes,
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use civdraft_api::{DraftService, SessionEvent, Subscription};
use civdraft_domain::SessionKey;
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::session::SessionKeyPath;

/// Messages sent to live clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Sent once when the connection opens.
    Connected {
        /// The watched session.
        session_key: String,
        /// The version at connect time, if the session exists.
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<i64>,
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
    /// A write produced a new version.
    Updated {
        /// The new version.
        version: i64,
    },
    /// The session was deleted.
    Deleted,
}

impl From<SessionEvent> for LiveMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Updated { version } => Self::Updated { version },
            SessionEvent::Deleted => Self::Deleted,
        }
    }
}

/// Upgrades `GET /api/session/{key}/live` to a WebSocket.
pub async fn live_session_handler(
    ws: WebSocketUpgrade,
    SessionKeyPath(key): SessionKeyPath,
    AxumState(state): AxumState<AppState>,
) -> Response {
    let heartbeat: Duration = state.heartbeat;
    ws.on_upgrade(move |socket| handle_socket(socket, state.service, key, heartbeat))
}

async fn handle_socket(
    socket: WebSocket,
    service: DraftService,
    key: SessionKey,
    heartbeat: Duration,
) {
    info!(session_key = %key, "Client connected to live session stream");

    // Subscribe before reading the version so no write slips between them.
    let mut subscription: Subscription = service.subscribe(&key);
    let version: Option<i64> = match service.session_version(&key).await {
        Ok(response) => response.version,
        Err(e) => {
            warn!(session_key = %key, error = %e, "Could not read version for live client");
            None
        }
    };

    let (mut sender, mut receiver) = socket.split();

    let connected: LiveMessage = LiveMessage::Connected {
        session_key: key.to_string(),
        version,
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!(session_key = %key, "Failed to send connection confirmation");
        return;
    }

    let pong_received: Arc<AtomicBool> = Arc::new(AtomicBool::new(true));

    let send_pong_flag: Arc<AtomicBool> = Arc::clone(&pong_received);
    let send_key: SessionKey = key.clone();
    let mut send_task = tokio::spawn(async move {
        let mut ticker: tokio::time::Interval = tokio::time::interval(heartbeat);
        ticker.tick().await;

        loop {
            tokio::select! {
                event = subscription.recv() => {
                    let Some(event) = event else {
                        debug!(session_key = %send_key, "Notifier closed");
                        break;
                    };
                    match serde_json::to_string(&LiveMessage::from(event)) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!(?e, "Failed to serialize live message");
                        }
                    }
                }
                _ = ticker.tick() => {
                    if !send_pong_flag.swap(false, Ordering::SeqCst) {
                        warn!(session_key = %send_key, "Live client missed heartbeat");
                        break;
                    }
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = sender.send(Message::Close(None)).await;
    });

    let recv_key: SessionKey = key.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Pong(_)) => {
                    pong_received.store(true, Ordering::SeqCst);
                }
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!(session_key = %recv_key, "Ignoring message from live client");
                }
                Ok(Message::Close(_)) => {
                    debug!(session_key = %recv_key, "Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_)) => {}
                Err(e) => {
                    debug!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    info!(session_key = %key, "Client disconnected from live session stream");
}
