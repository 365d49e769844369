// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical device state.
//!
//! Each backend decodes its own wire shape and translates it into a
//! [`DeviceState`]. A poll tick wraps that state in a [`Snapshot`] and
//! replaces the previous one wholesale; readers only ever see complete
//! snapshots.
//!
//! # Examples
//!
//! ```
//! use cloudlink_lib::state::{DeviceState, Snapshot};
//! use cloudlink_lib::types::PowerState;
//!
//! let mut state = DeviceState::new();
//! state.set_power(PowerState::On);
//! state.set_target_celsius(21.5);
//!
//! let snapshot = Snapshot::new(state);
//! assert!(snapshot.state().power().is_on());
//! ```

mod device_state;
mod snapshot;

pub use device_state::{DeviceState, NightLight, RgbColor};
pub use snapshot::Snapshot;
