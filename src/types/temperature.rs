// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature unit and conversions.

use serde::{Deserialize, Serialize};

/// Converts Fahrenheit to Celsius.
///
/// No rounding is applied; the result carries full `f64` precision.
///
/// # Examples
///
/// ```
/// use cloudlink_lib::types::fahrenheit_to_celsius;
///
/// assert_eq!(fahrenheit_to_celsius(212.0), 100.0);
/// ```
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Converts Celsius to Fahrenheit.
///
/// # Examples
///
/// ```
/// use cloudlink_lib::types::celsius_to_fahrenheit;
///
/// assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
/// ```
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Temperature unit the device displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    #[serde(rename = "C")]
    Celsius,
    /// Degrees Fahrenheit.
    #[default]
    #[serde(rename = "F")]
    Fahrenheit,
}
