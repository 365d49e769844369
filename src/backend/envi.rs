// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Envi heater backend.
//!
//! Envi reports and accepts temperatures in Fahrenheit and addresses
//! devices by their numeric id.

use serde::Deserialize;
use serde_json::json;

use crate::command::Intent;
use crate::config::Endpoints;
use crate::error::Result;
use crate::protocol::{ApiRequest, Pipeline};
use crate::state::{DeviceState, NightLight, RgbColor};
use crate::types::{PowerState, TemperatureUnit, celsius_to_fahrenheit, fahrenheit_to_celsius};

use super::{DeviceIdentity, DevicePage, Vendor};

#[derive(Debug, Deserialize)]
struct ListedDevice {
    id: u64,
    serial_no: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct NightLightSetting {
    #[serde(default)]
    on: bool,
    #[serde(default)]
    brightness: u8,
    color: Option<RgbColor>,
}

/// Status payload of `GET device/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct EnviStatus {
    state: u8,
    ambient_temperature: Option<f64>,
    /// Heating target.
    current_temperature: Option<f64>,
    temperature_unit: Option<TemperatureUnit>,
    night_light_setting: Option<NightLightSetting>,
    child_lock_setting: Option<bool>,
}

impl EnviStatus {
    pub(crate) fn into_state(self) -> DeviceState {
        let mut state = DeviceState::new();
        state.set_power(PowerState::from_num(self.state));
        if let Some(f) = self.ambient_temperature {
            state.set_ambient_celsius(fahrenheit_to_celsius(f));
        }
        if let Some(f) = self.current_temperature {
            state.set_target_celsius(fahrenheit_to_celsius(f));
        }
        if let Some(unit) = self.temperature_unit {
            state.set_display_unit(unit);
        }
        if let Some(light) = self.night_light_setting {
            state.set_night_light(NightLight {
                on: light.on,
                brightness: light.brightness,
                color: light.color.unwrap_or(RgbColor::WHITE),
            });
        }
        if let Some(locked) = self.child_lock_setting {
            state.set_child_lock(locked);
        }
        state
    }
}

/// Backend for the Envi heater cloud.
#[derive(Debug, Clone)]
pub struct EnviBackend {
    endpoints: Endpoints,
}

impl EnviBackend {
    /// Creates the backend.
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub(crate) async fn list_devices(&self, pipeline: &Pipeline) -> Result<DevicePage> {
        let request = ApiRequest::get(self.endpoints.envi("device/list")?);
        let listed: Vec<ListedDevice> = pipeline.send_json(&request, "device list").await?;

        let devices = listed
            .into_iter()
            .map(|device| DeviceIdentity::new(Vendor::Envi, device.serial_no, device.id, device.name))
            .collect();
        Ok(DevicePage {
            devices,
            total_pages: 1,
        })
    }

    pub(crate) async fn fetch_state(
        &self,
        pipeline: &Pipeline,
        device: &DeviceIdentity,
    ) -> Result<DeviceState> {
        let url = self
            .endpoints
            .envi(&format!("device/{}", device.vendor_id()))?;
        let status: EnviStatus = pipeline
            .send_json(&ApiRequest::get(url), "device status")
            .await?;
        Ok(status.into_state())
    }

    pub(crate) fn command(
        &self,
        device: &DeviceIdentity,
        intent: &Intent,
    ) -> Result<Option<ApiRequest>> {
        let id = device.vendor_id();
        let request = match *intent {
            Intent::Power(power) => ApiRequest::patch(
                self.endpoints.envi(&format!("device/update-temperature/{id}"))?,
                json!({ "state": power.as_num() }),
            ),
            Intent::TargetTemperature(celsius) => ApiRequest::patch(
                self.endpoints.envi(&format!("device/update-temperature/{id}"))?,
                json!({ "temperature": celsius_to_fahrenheit(celsius) }),
            ),
            Intent::ChildLock(locked) => ApiRequest::patch(
                self.endpoints.envi(&format!("device/update/settings/{id}"))?,
                json!({ "child_lock_setting": locked }),
            ),
            Intent::NightLight(on) => ApiRequest::patch(
                self.endpoints.envi(&format!("device/update/settings/{id}"))?,
                json!({ "night_light_setting": { "on": on } }),
            ),
            Intent::FanMode(_) | Intent::Light(_) => return Ok(None),
        };
        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> EnviBackend {
        EnviBackend::new(Endpoints::local("http://127.0.0.1:9"))
    }

    fn heater() -> DeviceIdentity {
        DeviceIdentity::new(Vendor::Envi, "SN-0001", 42, "Living room")
    }

    #[test]
    fn status_is_converted_to_celsius() {
        let status: EnviStatus = serde_json::from_str(
            r#"{
                "state": 1,
                "ambient_temperature": 68,
                "current_temperature": 77,
                "temperature_unit": "F",
                "night_light_setting": {
                    "brightness": 50, "auto": false, "on": true, "off": false,
                    "color": {"r": 255, "g": 120, "b": 0}
                },
                "child_lock_setting": false,
                "device_status": 1
            }"#,
        )
        .unwrap();

        let state = status.into_state();
        assert_eq!(state.power(), PowerState::On);
        assert_eq!(state.ambient_celsius(), Some(20.0));
        assert_eq!(state.target_celsius(), Some(25.0));
        assert_eq!(state.display_unit(), Some(TemperatureUnit::Fahrenheit));
        assert_eq!(state.child_lock(), Some(false));
        let light = state.night_light().unwrap();
        assert!(light.on);
        assert_eq!(light.brightness, 50);
        assert_eq!(light.color, RgbColor { r: 255, g: 120, b: 0 });
        assert_eq!(state.fan_mode(), None);
    }

    #[test]
    fn sparse_status_leaves_fields_unknown() {
        let status: EnviStatus = serde_json::from_str(r#"{"state": 0}"#).unwrap();
        let state = status.into_state();
        assert_eq!(state.power(), PowerState::Off);
        assert_eq!(state.ambient_celsius(), None);
        assert_eq!(state.night_light(), None);
    }

    #[test]
    fn power_command() {
        let request = backend()
            .command(&heater(), &Intent::Power(PowerState::On))
            .unwrap()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:9/envi/device/update-temperature/42"
        );
        assert_eq!(request.body(), Some(&json!({"state": 1})));
    }

    #[test]
    fn target_temperature_is_sent_in_fahrenheit() {
        let request = backend()
            .command(&heater(), &Intent::TargetTemperature(20.0))
            .unwrap()
            .unwrap();
        assert_eq!(request.body(), Some(&json!({"temperature": 68.0})));
    }

    #[test]
    fn settings_commands() {
        let lock = backend()
            .command(&heater(), &Intent::ChildLock(true))
            .unwrap()
            .unwrap();
        assert_eq!(
            lock.url().as_str(),
            "http://127.0.0.1:9/envi/device/update/settings/42"
        );
        assert_eq!(lock.body(), Some(&json!({"child_lock_setting": true})));

        let light = backend()
            .command(&heater(), &Intent::NightLight(false))
            .unwrap()
            .unwrap();
        assert_eq!(
            light.body(),
            Some(&json!({"night_light_setting": {"on": false}}))
        );
    }

    #[test]
    fn purifier_intents_are_not_expressible() {
        assert!(backend().command(&heater(), &Intent::Light(true)).unwrap().is_none());
    }
}
