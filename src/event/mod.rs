// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for device lifecycle and snapshot updates.
//!
//! The [`EventBus`] uses tokio's broadcast channel so that any number of
//! adapters can follow what the pollers and the command dispatcher do
//! without holding a reference to the bridge.
//!
//! # Examples
//!
//! ```
//! use cloudlink_lib::event::{DeviceId, DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id = DeviceId::derive("envi", "SN-0001");
//! bus.publish(DeviceEvent::DeviceAdded { device_id });
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;
