// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device wrapper for the bridge.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::DeviceIdentity;
use crate::state::Snapshot;

/// Latest snapshot of a device; `None` until the first fetch succeeds.
pub type SnapshotSlot = Option<Arc<Snapshot>>;

/// A registered device and its poll task.
pub(crate) struct ManagedDevice {
    /// Identity as listed by the vendor.
    pub identity: DeviceIdentity,
    /// Publishes each new snapshot.
    pub snapshot_tx: Arc<watch::Sender<SnapshotSlot>>,
    /// Stops this device's poller only.
    pub cancel: CancellationToken,
    /// The poll task.
    pub task: JoinHandle<()>,
}

impl ManagedDevice {
    /// Returns the most recent snapshot, if any.
    pub fn snapshot(&self) -> SnapshotSlot {
        self.snapshot_tx.borrow().clone()
    }

    /// Creates a receiver that sees every future snapshot.
    pub fn watch(&self) -> watch::Receiver<SnapshotSlot> {
        self.snapshot_tx.subscribe()
    }

    /// Cancels the poll task and returns its handle.
    pub fn stop(self) -> JoinHandle<()> {
        self.cancel.cancel();
        self.task
    }
}

impl std::fmt::Debug for ManagedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedDevice")
            .field("identity", &self.identity)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
