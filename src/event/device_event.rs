// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use std::sync::Arc;

use crate::state::Snapshot;

use super::DeviceId;

/// Events emitted by the bridge.
///
/// # Examples
///
/// ```
/// use cloudlink_lib::event::{DeviceId, DeviceEvent};
///
/// let device_id = DeviceId::derive("envi", "SN-1");
/// let failed = DeviceEvent::poll_failed(device_id, "HTTP 503");
/// assert!(failed.is_poll_failure());
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A device was registered and its poller started.
    DeviceAdded {
        /// The ID of the added device.
        device_id: DeviceId,
    },

    /// A device was unregistered and its poller stopped.
    DeviceRemoved {
        /// The ID of the removed device.
        device_id: DeviceId,
    },

    /// A fresh snapshot replaced the previous one.
    ///
    /// Emitted by poll ticks and by the refresh that follows a command.
    SnapshotUpdated {
        /// The ID of the device.
        device_id: DeviceId,
        /// The new snapshot.
        snapshot: Arc<Snapshot>,
    },

    /// A poll tick failed. The previous snapshot is kept.
    PollFailed {
        /// The ID of the device.
        device_id: DeviceId,
        /// Rendered error.
        error: String,
    },
}

impl DeviceEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::SnapshotUpdated { device_id, .. }
            | Self::PollFailed { device_id, .. } => *device_id,
        }
    }

    /// Returns `true` if this is a device lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` if this is a snapshot update.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::SnapshotUpdated { .. })
    }

    /// Returns `true` if this reports a failed poll tick.
    #[must_use]
    pub fn is_poll_failure(&self) -> bool {
        matches!(self, Self::PollFailed { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: DeviceId) -> Self {
        Self::DeviceAdded { device_id }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::DeviceRemoved { device_id }
    }

    /// Creates a snapshot updated event.
    #[must_use]
    pub fn snapshot_updated(device_id: DeviceId, snapshot: Arc<Snapshot>) -> Self {
        Self::SnapshotUpdated {
            device_id,
            snapshot,
        }
    }

    /// Creates a poll failed event.
    #[must_use]
    pub fn poll_failed(device_id: DeviceId, error: impl Into<String>) -> Self {
        Self::PollFailed {
            device_id,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DeviceState;

    #[test]
    fn device_id_extraction() {
        let id = DeviceId::derive("envi", "a");

        assert_eq!(DeviceEvent::device_added(id).device_id(), id);
        assert_eq!(DeviceEvent::device_removed(id).device_id(), id);
        assert_eq!(DeviceEvent::poll_failed(id, "boom").device_id(), id);
    }

    #[test]
    fn lifecycle_events() {
        let id = DeviceId::derive("envi", "a");

        assert!(DeviceEvent::device_added(id).is_lifecycle());
        assert!(DeviceEvent::device_removed(id).is_lifecycle());
        assert!(!DeviceEvent::poll_failed(id, "boom").is_lifecycle());
    }

    #[test]
    fn snapshot_events() {
        let id = DeviceId::derive("coway", "b");
        let snapshot = Arc::new(Snapshot::new(DeviceState::default()));

        let event = DeviceEvent::snapshot_updated(id, snapshot);
        assert!(event.is_snapshot());
        assert!(!event.is_lifecycle());
        assert!(!event.is_poll_failure());
    }

    #[test]
    fn poll_failed_carries_message() {
        let id = DeviceId::derive("coway", "b");
        let DeviceEvent::PollFailed { error, .. } = DeviceEvent::poll_failed(id, "timeout") else {
            panic!("Expected PollFailed event");
        };
        assert_eq!(error, "timeout");
    }
}
