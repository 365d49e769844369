// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by both vendor backends.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state of a heater or purifier
//! - [`FanMode`] - Purifier fan program
//! - [`TemperatureUnit`] - Display unit reported by the device
//!
//! Temperatures cross a unit boundary: the public API works in Celsius while
//! both vendor APIs work in Fahrenheit. [`fahrenheit_to_celsius`] and
//! [`celsius_to_fahrenheit`] are the only conversion points.

mod fan_mode;
mod power;
mod temperature;

pub use fan_mode::FanMode;
pub use power::PowerState;
pub use temperature::{TemperatureUnit, celsius_to_fahrenheit, fahrenheit_to_celsius};
