// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device poll loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, DeviceIdentity};
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, EventBus};
use crate::protocol::Pipeline;
use crate::state::Snapshot;

use super::managed_device::SnapshotSlot;

/// State every poller and command call of a bridge shares.
#[derive(Debug)]
pub(crate) struct Shared {
    pub backend: Backend,
    pub pipeline: Pipeline,
    pub events: EventBus,
}

/// Fetches the device state once and publishes the new snapshot.
///
/// The snapshot is stamped with the time the fetch started. Returns `None`
/// when a fetch that started later has already been installed, in which
/// case nothing is published.
pub(crate) async fn refresh(
    shared: &Shared,
    identity: &DeviceIdentity,
    snapshot_tx: &watch::Sender<SnapshotSlot>,
) -> Result<Option<Arc<Snapshot>>> {
    let started = Utc::now();
    let state = shared
        .backend
        .fetch_state(&shared.pipeline, identity)
        .await?;
    let snapshot = Arc::new(Snapshot::fetched_at(state, started));

    if !install(snapshot_tx, &snapshot) {
        tracing::debug!(device = %identity.id(), "discarding snapshot older than the current one");
        return Ok(None);
    }
    shared.events.publish(DeviceEvent::snapshot_updated(
        identity.id(),
        Arc::clone(&snapshot),
    ));
    Ok(Some(snapshot))
}

/// Stores `snapshot` unless the slot holds one from a later fetch.
fn install(snapshot_tx: &watch::Sender<SnapshotSlot>, snapshot: &Arc<Snapshot>) -> bool {
    snapshot_tx.send_if_modified(|slot| {
        if slot
            .as_ref()
            .is_some_and(|current| current.timestamp() > snapshot.timestamp())
        {
            return false;
        }
        *slot = Some(Arc::clone(snapshot));
        true
    })
}

/// Publishes a failed fetch without interrupting the caller.
pub(crate) fn report_failure(shared: &Shared, identity: &DeviceIdentity, error: &Error) {
    tracing::warn!(device = %identity.id(), name = identity.name(), error = %error, "status fetch failed");
    shared
        .events
        .publish(DeviceEvent::poll_failed(identity.id(), error.to_string()));
}

/// Polls until `cancel` fires.
///
/// The first fetch happens immediately. The next one is scheduled
/// `interval` after the previous fetch finished; fetches never overlap.
pub(crate) async fn run(
    shared: Arc<Shared>,
    identity: DeviceIdentity,
    snapshot_tx: Arc<watch::Sender<SnapshotSlot>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let device = identity.id();
    tracing::debug!(device = %device, interval_ms = interval.as_millis(), "poller started");

    loop {
        let outcome = tokio::select! {
            () = cancel.cancelled() => break,
            outcome = refresh(&shared, &identity, &snapshot_tx) => outcome,
        };

        match outcome {
            Ok(Some(snapshot)) => {
                tracing::debug!(device = %device, power = %snapshot.state().power(), "snapshot updated");
            }
            Ok(None) => {}
            Err(e) => report_failure(&shared, &identity, &e),
        }

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!(device = %device, "poller stopped");
}
