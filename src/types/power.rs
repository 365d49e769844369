// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents the power state of a device.
///
/// Both vendor APIs encode power as an integer (`0` off, `1` on).
///
/// # Examples
///
/// ```
/// use cloudlink_lib::types::PowerState;
///
/// assert_eq!(PowerState::On.as_num(), 1);
/// assert_eq!(PowerState::from_num(0), PowerState::Off);
/// assert!(PowerState::from(true).is_on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// Power is off.
    #[default]
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Returns the display string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the numeric value used on the wire.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Decodes a wire value. Any non-zero value means on.
    #[must_use]
    pub const fn from_num(value: u8) -> Self {
        if value == 0 { Self::Off } else { Self::On }
    }

    /// Returns `true` if the device is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values() {
        assert_eq!(PowerState::Off.as_num(), 0);
        assert_eq!(PowerState::On.as_num(), 1);
    }

    #[test]
    fn from_num_treats_nonzero_as_on() {
        assert_eq!(PowerState::from_num(0), PowerState::Off);
        assert_eq!(PowerState::from_num(1), PowerState::On);
        assert_eq!(PowerState::from_num(2), PowerState::On);
    }

    #[test]
    fn display() {
        assert_eq!(PowerState::On.to_string(), "ON");
        assert_eq!(PowerState::Off.to_string(), "OFF");
    }
}
