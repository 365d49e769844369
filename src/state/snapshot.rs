// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timestamped device state.

use chrono::{DateTime, Utc};

use super::DeviceState;

/// The most recently fetched state of one device.
///
/// Snapshots are immutable; a poll tick builds a new one and swaps it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    state: DeviceState,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Wraps a state fetched just now.
    #[must_use]
    pub fn new(state: DeviceState) -> Self {
        Self::fetched_at(state, Utc::now())
    }

    /// Wraps a state fetched at the given instant.
    #[must_use]
    pub fn fetched_at(state: DeviceState, fetched_at: DateTime<Utc>) -> Self {
        Self { state, fetched_at }
    }

    /// Returns the device state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns when the fetch that produced this state started.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Returns how long ago the state was fetched.
    #[must_use]
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.fetched_at
    }
}
