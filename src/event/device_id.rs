// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

use uuid::Uuid;

/// Stable local identifier for a cloud device.
///
/// The id is a UUID v5 computed from the vendor name and the device's
/// external id (serial number or barcode), so a device keeps the same id
/// across restarts and a host can match it against its own cache.
///
/// # Examples
///
/// ```
/// use cloudlink_lib::event::DeviceId;
///
/// let a = DeviceId::derive("envi", "SN-0001");
/// let b = DeviceId::derive("envi", "SN-0001");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Derives the identifier for a device of the given vendor.
    #[must_use]
    pub fn derive(vendor: &str, external_id: &str) -> Self {
        let name = format!("cloudlink://{vendor}/{external_id}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }

    /// Creates a device identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let short = &self.0.to_string()[..8];
        write!(f, "DeviceId({short}...)")
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DeviceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<DeviceId> for Uuid {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}
