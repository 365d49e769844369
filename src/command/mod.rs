// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-issued commands.
//!
//! An [`Intent`] says what the user wants changed, in canonical units. Each
//! backend decides how (and whether) it can express that on its wire.
//!
//! | Intent | Envi | Coway |
//! |--------|------|-------|
//! | [`Intent::Power`] | yes | yes |
//! | [`Intent::TargetTemperature`] | yes | no |
//! | [`Intent::ChildLock`] | yes | yes |
//! | [`Intent::NightLight`] | yes | no |
//! | [`Intent::FanMode`] | no | yes |
//! | [`Intent::Light`] | no | yes |
//!
//! # Examples
//!
//! ```
//! use cloudlink_lib::command::Intent;
//! use cloudlink_lib::types::PowerState;
//!
//! let intent = Intent::Power(PowerState::On);
//! assert_eq!(intent.name(), "power");
//! ```

use crate::types::{FanMode, PowerState};

/// A requested state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Switch the device on or off.
    Power(PowerState),
    /// Set the heating target, in degrees Celsius.
    TargetTemperature(f64),
    /// Lock or unlock the physical controls.
    ChildLock(bool),
    /// Switch the heater's night light.
    NightLight(bool),
    /// Select the purifier fan mode.
    FanMode(FanMode),
    /// Switch the purifier's indicator light.
    Light(bool),
}

impl Intent {
    /// Returns a short name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Power(_) => "power",
            Self::TargetTemperature(_) => "target temperature",
            Self::ChildLock(_) => "child lock",
            Self::NightLight(_) => "night light",
            Self::FanMode(_) => "fan mode",
            Self::Light(_) => "light",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(Intent::TargetTemperature(21.5).name(), "target temperature");
        assert_eq!(Intent::FanMode(FanMode::Turbo).name(), "fan mode");
        assert_eq!(Intent::Light(true).name(), "light");
    }
}
