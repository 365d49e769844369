// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coway IoCare purifier backend. Devices are addressed by barcode.

use serde::Deserialize;
use serde_json::json;

use crate::command::Intent;
use crate::config::Endpoints;
use crate::error::Result;
use crate::protocol::{ApiRequest, Pipeline};
use crate::state::DeviceState;
use crate::types::{FanMode, PowerState};

use super::{DeviceIdentity, DevicePage, Vendor};

/// Devices requested per listing page.
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceListing {
    #[serde(default)]
    device_infos: Vec<DeviceInfo>,
    #[serde(default = "one")]
    total_pages: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInfo {
    barcode: String,
    #[serde(default)]
    dvc_nick: String,
    #[serde(default)]
    device_seq: u64,
}

/// Status payload of `GET com/devices/{barcode}/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurifierStatus {
    power: u8,
    fan_mode: Option<FanMode>,
    light: Option<bool>,
    child_lock: Option<bool>,
    pm25: Option<u16>,
}

impl PurifierStatus {
    pub(crate) fn into_state(self) -> DeviceState {
        let mut state = DeviceState::new();
        state.set_power(PowerState::from_num(self.power));
        if let Some(mode) = self.fan_mode {
            state.set_fan_mode(mode);
        }
        if let Some(on) = self.light {
            state.set_light_on(on);
        }
        if let Some(locked) = self.child_lock {
            state.set_child_lock(locked);
        }
        if let Some(pm25) = self.pm25 {
            state.set_pm25(pm25);
        }
        state
    }
}

/// Backend for the Coway IoCare cloud.
#[derive(Debug, Clone)]
pub struct CowayBackend {
    endpoints: Endpoints,
}

impl CowayBackend {
    /// Creates the backend.
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub(crate) async fn list_devices(&self, pipeline: &Pipeline) -> Result<DevicePage> {
        let mut url = self.endpoints.coway("com/user-devices")?;
        url.query_pairs_mut()
            .append_pair("pageIndex", "0")
            .append_pair("pageSize", &PAGE_SIZE.to_string());

        let listing: DeviceListing = pipeline
            .send_json(&ApiRequest::get(url), "device list")
            .await?;

        let devices = listing
            .device_infos
            .into_iter()
            .map(|info| DeviceIdentity::new(Vendor::Coway, info.barcode, info.device_seq, info.dvc_nick))
            .collect();
        Ok(DevicePage {
            devices,
            total_pages: listing.total_pages,
        })
    }

    pub(crate) async fn fetch_state(
        &self,
        pipeline: &Pipeline,
        device: &DeviceIdentity,
    ) -> Result<DeviceState> {
        let url = self.endpoints.coway(&format!(
            "com/devices/{}/status",
            urlencoding::encode(device.external_id())
        ))?;
        let status: PurifierStatus = pipeline
            .send_json(&ApiRequest::get(url), "device status")
            .await?;
        Ok(status.into_state())
    }

    pub(crate) fn command(
        &self,
        device: &DeviceIdentity,
        intent: &Intent,
    ) -> Result<Option<ApiRequest>> {
        let body = match *intent {
            Intent::Power(power) => json!({ "power": power.as_num() }),
            Intent::FanMode(mode) => json!({ "fanMode": mode.as_str() }),
            Intent::Light(on) => json!({ "light": on }),
            Intent::ChildLock(locked) => json!({ "childLock": locked }),
            Intent::TargetTemperature(_) | Intent::NightLight(_) => return Ok(None),
        };
        let url = self.endpoints.coway(&format!(
            "com/devices/{}/control",
            urlencoding::encode(device.external_id())
        ))?;
        Ok(Some(ApiRequest::patch(url, body)))
    }
}
