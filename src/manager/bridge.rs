// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bridge: one vendor account, its devices and their pollers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::auth::Authenticator;
use crate::backend::{Backend, DeviceIdentity, Vendor};
use crate::command::Intent;
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::protocol::Pipeline;
use crate::session::Session;
use crate::state::Snapshot;

use super::managed_device::{ManagedDevice, SnapshotSlot};
use super::poller::{self, Shared};

/// Bridges one vendor account to the canonical device model.
///
/// A bridge owns the account [`Session`], one poll task per registered
/// device, and an event bus. All of them share a single [`Pipeline`], so a
/// credential renewed by one poller is immediately used by the others.
///
/// Poll tasks are spawned on the current tokio runtime. Dropping the bridge
/// cancels them; [`shutdown`](Self::shutdown) also waits for them to exit.
///
/// # Examples
///
/// ```no_run
/// use cloudlink_lib::backend::Vendor;
/// use cloudlink_lib::command::Intent;
/// use cloudlink_lib::config::BridgeConfig;
/// use cloudlink_lib::manager::Bridge;
/// use cloudlink_lib::types::PowerState;
///
/// # async fn example() -> cloudlink_lib::Result<()> {
/// let bridge = Bridge::new(BridgeConfig::new(Vendor::Envi, "me@example.com", "secret"))?;
///
/// for device in bridge.discover_devices().await? {
///     println!("{} ({})", device.name(), device.id());
///     bridge.set_state(device.id(), Intent::Power(PowerState::On)).await?;
/// }
///
/// bridge.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bridge {
    shared: Arc<Shared>,
    poll_interval: Duration,
    devices: RwLock<HashMap<DeviceId, ManagedDevice>>,
    root: CancellationToken,
}

impl Bridge {
    /// Creates a bridge for the configured account.
    ///
    /// No network traffic happens until the first device call; the login
    /// runs lazily on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, or a
    /// communication error if the HTTP client cannot be built.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let authenticator = Authenticator::for_config(&config)?;
        let session = Arc::new(Session::new(
            http.clone(),
            authenticator,
            config.recovery(),
        ));
        let pipeline = Pipeline::new(http, session);

        tracing::debug!(
            vendor = %config.vendor(),
            poll_interval_ms = config.poll_interval().as_millis(),
            "bridge created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                backend: Backend::for_config(&config),
                pipeline,
                events: EventBus::new(),
            }),
            poll_interval: config.poll_interval(),
            devices: RwLock::new(HashMap::new()),
            root: CancellationToken::new(),
        })
    }

    /// Returns the vendor this bridge talks to.
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        self.shared.backend.vendor()
    }

    /// Returns the account session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.shared.pipeline.session()
    }

    /// Subscribes to device events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.shared.events.subscribe()
    }

    /// Lists the account's devices and starts polling each one.
    ///
    /// Devices that are already registered keep their poller.
    ///
    /// # Errors
    ///
    /// Returns the error of the listing request.
    pub async fn discover_devices(&self) -> Result<Vec<DeviceIdentity>> {
        let devices = self
            .shared
            .backend
            .list_devices(&self.shared.pipeline)
            .await?;

        for device in &devices {
            self.register(device.clone()).await;
        }
        Ok(devices)
    }

    /// Starts polling a device, typically one restored from a host cache.
    ///
    /// Registering an id twice is a no-op. Publishes
    /// [`DeviceEvent::DeviceAdded`] for new devices.
    pub async fn register(&self, identity: DeviceIdentity) -> DeviceId {
        let device_id = identity.id();
        let mut devices = self.devices.write().await;

        if let Some(existing) = devices.get_mut(&device_id) {
            tracing::debug!(device = %device_id, name = identity.name(), "device already registered");
            existing.identity = identity;
            return device_id;
        }

        tracing::info!(device = %device_id, name = identity.name(), external_id = identity.external_id(), "adding device");

        let (tx, _) = watch::channel(None);
        let snapshot_tx = Arc::new(tx);
        let cancel = self.root.child_token();
        let task = tokio::spawn(poller::run(
            Arc::clone(&self.shared),
            identity.clone(),
            Arc::clone(&snapshot_tx),
            self.poll_interval,
            cancel.clone(),
        ));

        devices.insert(
            device_id,
            ManagedDevice {
                identity,
                snapshot_tx,
                cancel,
                task,
            },
        );
        drop(devices);

        self.shared.events.publish(DeviceEvent::device_added(device_id));
        device_id
    }

    /// Stops polling a device and forgets it.
    ///
    /// Returns `true` if the device was registered.
    pub async fn unregister(&self, device_id: DeviceId) -> bool {
        let Some(device) = self.devices.write().await.remove(&device_id) else {
            return false;
        };

        tracing::info!(device = %device_id, name = device.identity.name(), "removing device");
        let task = device.stop();
        if let Err(e) = task.await {
            tracing::warn!(device = %device_id, error = %e, "poller ended abnormally");
        }

        self.shared
            .events
            .publish(DeviceEvent::device_removed(device_id));
        true
    }

    /// Returns the ids of all registered devices.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Returns a registered device's identity.
    pub async fn identity(&self, device_id: DeviceId) -> Option<DeviceIdentity> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| device.identity.clone())
    }

    /// Returns the most recent snapshot of a device.
    ///
    /// `None` if the device is unknown or no fetch has succeeded yet. The
    /// snapshot may be up to one poll interval old.
    pub async fn snapshot(&self, device_id: DeviceId) -> Option<Arc<Snapshot>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .and_then(ManagedDevice::snapshot)
    }

    /// Creates a receiver for a device's snapshots.
    pub async fn watch(&self, device_id: DeviceId) -> Option<watch::Receiver<SnapshotSlot>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(ManagedDevice::watch)
    }

    /// Applies an intent to a device.
    ///
    /// Sends the vendor command, then fetches the status once so that the
    /// snapshot reflects the change before this returns. If that fetch
    /// fails, the failure is logged and published as
    /// [`DeviceEvent::PollFailed`]; the command itself still succeeded.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] if the device is not registered
    /// - [`Error::UnsupportedIntent`] if the vendor cannot express the intent
    /// - any pipeline error raised while sending the command
    pub async fn set_state(&self, device_id: DeviceId, intent: Intent) -> Result<()> {
        let (identity, snapshot_tx) = {
            let devices = self.devices.read().await;
            let device = devices
                .get(&device_id)
                .ok_or(Error::DeviceNotFound(device_id))?;
            (device.identity.clone(), Arc::clone(&device.snapshot_tx))
        };

        let request = self.shared.backend.command(&identity, &intent)?;
        tracing::info!(device = %device_id, intent = ?intent, "sending command");

        let response = self.shared.pipeline.send(&request).await?;
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(device = %device_id, body = %body, "command accepted");

        if let Err(e) = poller::refresh(&self.shared, &identity, &snapshot_tx).await {
            poller::report_failure(&self.shared, &identity, &e);
        }
        Ok(())
    }

    /// Stops every poller and waits for them to exit.
    pub async fn shutdown(&self) {
        self.root.cancel();

        let devices: Vec<_> = self.devices.write().await.drain().collect();
        for (device_id, device) in devices {
            if let Err(e) = device.stop().await {
                tracing::warn!(device = %device_id, error = %e, "poller ended abnormally");
            }
        }
        tracing::debug!("bridge shut down");
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
