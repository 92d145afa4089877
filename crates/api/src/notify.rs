// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-session change notification.
//!
//! Notifications are advisory. They tell a viewer that a newer version
//! exists; the viewer re-fetches the session to learn what changed. A viewer
//! that misses a notification catches up on its next version poll.
//!
//! # Architecture
//!
//! - One `tokio::sync::broadcast` channel per session key with subscribers
//! - A channel is removed when its last subscriber drops
//! - Publishing never blocks and never fails the caller

use civdraft_domain::SessionKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

/// Events buffered per session before slow subscribers start skipping.
const EVENT_BUFFER_SIZE: usize = 16;

type ChannelTable = HashMap<SessionKey, broadcast::Sender<SessionEvent>>;

/// Something happened to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A write produced this version.
    Updated {
        /// The new version.
        version: i64,
    },
    /// The session was deleted.
    Deleted,
}

/// Fans session events out to local subscribers.
///
/// Constructed once per process and shared by cloning.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    channels: Arc<Mutex<ChannelTable>>,
    closed: Arc<AtomicBool>,
}

impl ChangeNotifier {
    /// Creates a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, ChannelTable> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers interest in `key`.
    ///
    /// After [`ChangeNotifier::shutdown`] the subscription is already closed.
    #[must_use]
    pub fn subscribe(&self, key: &SessionKey) -> Subscription {
        let receiver: broadcast::Receiver<SessionEvent> = if self.closed.load(Ordering::SeqCst) {
            broadcast::channel(1).1
        } else {
            self.table()
                .entry(key.clone())
                .or_insert_with(|| broadcast::channel(EVENT_BUFFER_SIZE).0)
                .subscribe()
        };

        debug!(session_key = %key, "Subscribed to session events");
        Subscription {
            key: key.clone(),
            receiver,
            channels: Arc::clone(&self.channels),
        }
    }

    /// Delivers `event` to every current subscriber of `key`.
    ///
    /// Returns how many subscribers were reached. Keys without subscribers
    /// are ignored.
    pub fn publish(&self, key: &SessionKey, event: SessionEvent) -> usize {
        let table: MutexGuard<'_, ChannelTable> = self.table();
        let Some(sender) = table.get(key) else {
            return 0;
        };
        let delivered: usize = sender.send(event).unwrap_or(0);
        debug!(session_key = %key, ?event, delivered, "Published session event");
        delivered
    }

    /// Number of subscribers for `key`.
    #[must_use]
    pub fn subscriber_count(&self, key: &SessionKey) -> usize {
        self.table()
            .get(key)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of keys with at least one subscriber.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.table().len()
    }

    /// Closes every subscription and refuses new ones.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let dropped: usize = {
            let mut table: MutexGuard<'_, ChannelTable> = self.table();
            let count: usize = table.len();
            table.clear();
            count
        };
        debug!(channels = dropped, "Change notifier shut down");
    }
}

/// A live registration for one session's events.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    key: SessionKey,
    receiver: broadcast::Receiver<SessionEvent>,
    channels: Arc<Mutex<ChannelTable>>,
}

impl Subscription {
    /// The subscribed key.
    #[must_use]
    pub const fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the notifier has shut down. A subscriber that
    /// fell behind skips to the oldest event still buffered.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(session_key = %self.key, skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut table: MutexGuard<'_, ChannelTable> =
            self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        // This receiver is still alive, so a count of one means it is the last.
        if table
            .get(&self.key)
            .is_some_and(|sender| sender.receiver_count() == 1)
        {
            table.remove(&self.key);
        }
    }
}
