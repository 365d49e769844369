// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use crate::event::DeviceId;

use super::Vendor;

/// A device as listed by its vendor cloud.
///
/// The [`DeviceId`] is derived from the vendor and the external id, so a
/// host that caches identities gets the same id back after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    id: DeviceId,
    vendor: Vendor,
    external_id: String,
    vendor_id: u64,
    name: String,
}

impl DeviceIdentity {
    /// Creates an identity.
    ///
    /// `external_id` is the Envi serial number or the Coway barcode;
    /// `vendor_id` is the vendor's numeric device id.
    #[must_use]
    pub fn new(
        vendor: Vendor,
        external_id: impl Into<String>,
        vendor_id: u64,
        name: impl Into<String>,
    ) -> Self {
        let external_id = external_id.into();
        Self {
            id: DeviceId::derive(vendor.as_str(), &external_id),
            vendor,
            external_id,
            vendor_id,
            name: name.into(),
        }
    }

    /// Returns the local device id.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the vendor.
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Returns the serial number or barcode.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the vendor's numeric id.
    #[must_use]
    pub fn vendor_id(&self) -> u64 {
        self.vendor_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_follows_external_id() {
        let a = DeviceIdentity::new(Vendor::Envi, "SN-1", 7, "Office");
        let renamed = DeviceIdentity::new(Vendor::Envi, "SN-1", 7, "Study");
        let other = DeviceIdentity::new(Vendor::Envi, "SN-2", 8, "Office");

        assert_eq!(a.id(), renamed.id());
        assert_ne!(a.id(), other.id());
    }

    #[test]
    fn vendor_is_part_of_id() {
        let envi = DeviceIdentity::new(Vendor::Envi, "X1", 1, "a");
        let coway = DeviceIdentity::new(Vendor::Coway, "X1", 1, "a");
        assert_ne!(envi.id(), coway.id());
    }
}
