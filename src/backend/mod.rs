// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor backends.
//!
//! A backend knows its vendor's URL layout and wire shapes: how to list the
//! account's devices, how to turn a status payload into a canonical
//! [`DeviceState`], and how to express an [`Intent`] as a single request.
//! Sending is always left to the [`Pipeline`].

mod coway;
mod envi;
mod identity;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Intent;
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::protocol::{ApiRequest, Pipeline};
use crate::state::DeviceState;

pub use coway::CowayBackend;
pub use envi::EnviBackend;
pub use identity::DeviceIdentity;

/// Supported vendor clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Envi wall heaters.
    Envi,
    /// Coway air purifiers.
    Coway,
}

impl Vendor {
    /// Returns the lowercase vendor name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Envi => "envi",
            Self::Coway => "coway",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a device listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePage {
    /// Devices on this page.
    pub devices: Vec<DeviceIdentity>,
    /// Total number of pages the vendor reports.
    pub total_pages: u32,
}

/// The vendor backend of a bridge.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Envi heater cloud.
    Envi(EnviBackend),
    /// Coway IoCare cloud.
    Coway(CowayBackend),
}

impl Backend {
    /// Builds the backend for a configuration.
    #[must_use]
    pub fn for_config(config: &BridgeConfig) -> Self {
        match config.vendor() {
            Vendor::Envi => Self::Envi(EnviBackend::new(config.endpoints().clone())),
            Vendor::Coway => Self::Coway(CowayBackend::new(config.endpoints().clone())),
        }
    }

    /// Returns the vendor.
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        match self {
            Self::Envi(_) => Vendor::Envi,
            Self::Coway(_) => Vendor::Coway,
        }
    }

    /// Lists the account's devices.
    ///
    /// Only the first page is fetched. If the vendor reports more pages, a
    /// warning is logged and the remaining devices are not returned.
    ///
    /// # Errors
    ///
    /// Returns any pipeline error, or [`Error::Protocol`] for a malformed
    /// listing.
    pub async fn list_devices(&self, pipeline: &Pipeline) -> Result<Vec<DeviceIdentity>> {
        let page = match self {
            Self::Envi(backend) => backend.list_devices(pipeline).await?,
            Self::Coway(backend) => backend.list_devices(pipeline).await?,
        };

        if page.total_pages > 1 {
            tracing::warn!(
                vendor = %self.vendor(),
                total_pages = page.total_pages,
                returned = page.devices.len(),
                "device list is paginated, only the first page is used"
            );
        }
        tracing::debug!(vendor = %self.vendor(), count = page.devices.len(), "devices listed");
        Ok(page.devices)
    }

    /// Fetches and translates the current state of a device.
    ///
    /// # Errors
    ///
    /// Returns any pipeline error, or [`Error::Protocol`] for a malformed
    /// status payload.
    pub async fn fetch_state(
        &self,
        pipeline: &Pipeline,
        device: &DeviceIdentity,
    ) -> Result<DeviceState> {
        match self {
            Self::Envi(backend) => backend.fetch_state(pipeline, device).await,
            Self::Coway(backend) => backend.fetch_state(pipeline, device).await,
        }
    }

    /// Serializes an intent into the request that applies it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedIntent`] if the vendor has no way to
    /// express the intent.
    pub fn command(&self, device: &DeviceIdentity, intent: &Intent) -> Result<ApiRequest> {
        let request = match self {
            Self::Envi(backend) => backend.command(device, intent)?,
            Self::Coway(backend) => backend.command(device, intent)?,
        };
        request.ok_or(Error::UnsupportedIntent {
            vendor: self.vendor().as_str(),
            intent: intent.name(),
        })
    }
}
