// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for engine events.

use tokio::sync::broadcast;

use super::LightEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out channel for [`LightEvent`]s.
///
/// Every subscriber receives its own copy of each event published after it
/// subscribed. A subscriber that falls more than the channel capacity behind
/// loses the oldest events and sees `RecvError::Lagged`.
///
/// Cloning the bus shares the underlying channel.
///
/// # Examples
///
/// ```
/// use lightgrid::event::{EventBus, LightEvent};
/// use lightgrid::music::MusicState;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(LightEvent::MusicStateChanged { state: MusicState::Running });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LightEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity (256).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering at most `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LightEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to every subscriber.
    ///
    /// Events published with no subscribers are discarded.
    pub fn publish(&self, event: LightEvent) {
        // No receivers is not an error for the publisher
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
