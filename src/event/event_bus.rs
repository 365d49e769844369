// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast fan-out of [`DeviceEvent`]s.

use tokio::sync::broadcast;

use super::DeviceEvent;

/// Events a subscriber may fall behind by before it starts losing the
/// oldest ones.
const BACKLOG: usize = 256;

/// Fan-out point for device events of one bridge.
///
/// The bridge owns the bus inside the state it shares with its pollers, so
/// registrations, snapshot updates and tick failures all land on the same
/// channel. A subscriber only sees events published after it subscribed;
/// one that falls more than 256 events behind gets
/// [`RecvError::Lagged`](broadcast::error::RecvError::Lagged) and resumes
/// at the oldest retained event.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BACKLOG);
        Self { sender }
    }

    /// Opens a new subscription.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Hands `event` to every current subscriber.
    pub fn publish(&self, event: DeviceEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("no event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
