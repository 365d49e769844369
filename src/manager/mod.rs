// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device bridge coordinating discovery, polling and commands.
//!
//! The [`Bridge`] is the entry point for host integrations:
//!
//! - **Discovery**: list the account's devices and start polling them
//! - **Snapshots**: read or watch the latest state of each device
//! - **Commands**: apply an [`Intent`](crate::command::Intent) and refresh
//! - **Events**: follow lifecycle, snapshot and failure events
//!
//! # Event Subscription
//!
//! ```no_run
//! use cloudlink_lib::backend::Vendor;
//! use cloudlink_lib::config::BridgeConfig;
//! use cloudlink_lib::event::DeviceEvent;
//! use cloudlink_lib::manager::Bridge;
//!
//! # fn example() -> cloudlink_lib::Result<()> {
//! let bridge = Bridge::new(BridgeConfig::new(Vendor::Coway, "me@example.com", "secret"))?;
//! let mut events = bridge.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             DeviceEvent::SnapshotUpdated { device_id, snapshot } => {
//!                 println!("{device_id}: {:?}", snapshot.state().power());
//!             }
//!             DeviceEvent::PollFailed { device_id, error } => {
//!                 eprintln!("{device_id}: {error}");
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod bridge;
mod managed_device;
mod poller;

pub use bridge::Bridge;
pub use managed_device::SnapshotSlot;
