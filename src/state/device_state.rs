// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol-agnostic device state.

use serde::{Deserialize, Serialize};

use crate::types::{FanMode, PowerState, TemperatureUnit};

/// An RGB color as reported by the Envi night light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl RgbColor {
    /// Plain white, the color the heater ships with.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// Night light settings of an Envi heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightLight {
    /// Whether the light is on.
    pub on: bool,
    /// Brightness in percent (0-100).
    pub brightness: u8,
    /// Light color.
    pub color: RgbColor,
}

/// Canonical state of a cloud device.
///
/// Temperatures are always Celsius, whatever the vendor reports. Fields a
/// backend does not know about stay `None`.
///
/// # Examples
///
/// ```
/// use cloudlink_lib::state::DeviceState;
/// use cloudlink_lib::types::{FanMode, PowerState};
///
/// let mut state = DeviceState::new();
/// state.set_power(PowerState::On);
/// state.set_fan_mode(FanMode::Auto);
///
/// assert_eq!(state.fan_mode(), Some(FanMode::Auto));
/// assert_eq!(state.target_celsius(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    power: PowerState,
    ambient_celsius: Option<f64>,
    target_celsius: Option<f64>,
    display_unit: Option<TemperatureUnit>,
    child_lock: Option<bool>,
    night_light: Option<NightLight>,
    fan_mode: Option<FanMode>,
    light_on: Option<bool>,
    pm25: Option<u16>,
}

impl DeviceState {
    /// Creates a new state with power off and nothing else known.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Power ==========

    /// Gets the power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Sets the power state.
    pub fn set_power(&mut self, power: PowerState) {
        self.power = power;
    }

    // ========== Temperatures ==========

    /// Gets the measured room temperature in Celsius.
    #[must_use]
    pub fn ambient_celsius(&self) -> Option<f64> {
        self.ambient_celsius
    }

    /// Sets the measured room temperature.
    pub fn set_ambient_celsius(&mut self, celsius: f64) {
        self.ambient_celsius = Some(celsius);
    }

    /// Gets the target setpoint in Celsius.
    #[must_use]
    pub fn target_celsius(&self) -> Option<f64> {
        self.target_celsius
    }

    /// Sets the target setpoint.
    pub fn set_target_celsius(&mut self, celsius: f64) {
        self.target_celsius = Some(celsius);
    }

    /// Gets the unit the device displays.
    #[must_use]
    pub fn display_unit(&self) -> Option<TemperatureUnit> {
        self.display_unit
    }

    /// Sets the display unit.
    pub fn set_display_unit(&mut self, unit: TemperatureUnit) {
        self.display_unit = Some(unit);
    }

    // ========== Settings ==========

    /// Gets the child lock setting.
    #[must_use]
    pub fn child_lock(&self) -> Option<bool> {
        self.child_lock
    }

    /// Sets the child lock setting.
    pub fn set_child_lock(&mut self, locked: bool) {
        self.child_lock = Some(locked);
    }

    /// Gets the night light settings.
    #[must_use]
    pub fn night_light(&self) -> Option<NightLight> {
        self.night_light
    }

    /// Sets the night light settings.
    pub fn set_night_light(&mut self, light: NightLight) {
        self.night_light = Some(light);
    }

    // ========== Purifier ==========

    /// Gets the fan program.
    #[must_use]
    pub fn fan_mode(&self) -> Option<FanMode> {
        self.fan_mode
    }

    /// Sets the fan program.
    pub fn set_fan_mode(&mut self, mode: FanMode) {
        self.fan_mode = Some(mode);
    }

    /// Gets whether the indicator light is on.
    #[must_use]
    pub fn light_on(&self) -> Option<bool> {
        self.light_on
    }

    /// Sets the indicator light state.
    pub fn set_light_on(&mut self, on: bool) {
        self.light_on = Some(on);
    }

    /// Gets the PM2.5 reading in µg/m³.
    #[must_use]
    pub fn pm25(&self) -> Option<u16> {
        self.pm25
    }

    /// Sets the PM2.5 reading.
    pub fn set_pm25(&mut self, value: u16) {
        self.pm25 = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_off_and_unknown() {
        let state = DeviceState::new();
        assert_eq!(state.power(), PowerState::Off);
        assert!(state.ambient_celsius().is_none());
        assert!(state.target_celsius().is_none());
        assert!(state.night_light().is_none());
        assert!(state.fan_mode().is_none());
    }

    #[test]
    fn setters_round_trip() {
        let mut state = DeviceState::new();
        state.set_power(PowerState::On);
        state.set_ambient_celsius(18.5);
        state.set_target_celsius(21.0);
        state.set_display_unit(TemperatureUnit::Celsius);
        state.set_child_lock(true);
        state.set_pm25(12);

        assert!(state.power().is_on());
        assert_eq!(state.ambient_celsius(), Some(18.5));
        assert_eq!(state.target_celsius(), Some(21.0));
        assert_eq!(state.display_unit(), Some(TemperatureUnit::Celsius));
        assert_eq!(state.child_lock(), Some(true));
        assert_eq!(state.pm25(), Some(12));
    }

    #[test]
    fn night_light_is_stored_whole() {
        let mut state = DeviceState::new();
        let light = NightLight {
            on: true,
            brightness: 40,
            color: RgbColor::WHITE,
        };
        state.set_night_light(light);
        assert_eq!(state.night_light(), Some(light));
    }
}
