// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Purifier fan program.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fan program of a Coway purifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    /// Speed follows the air-quality sensor.
    Auto,
    /// Quietest setting, display dimmed.
    Night,
    /// Manual speed 1.
    Low,
    /// Manual speed 2.
    Medium,
    /// Manual speed 3.
    High,
    /// Short boost at maximum speed.
    Turbo,
}

impl FanMode {
    /// Returns the wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Night => "night",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Turbo => "turbo",
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&FanMode::Turbo).unwrap();
        assert_eq!(json, "\"turbo\"");
        let mode: FanMode = serde_json::from_str("\"night\"").unwrap();
        assert_eq!(mode, FanMode::Night);
    }

    #[test]
    fn display_matches_wire_string() {
        assert_eq!(FanMode::Medium.to_string(), FanMode::Medium.as_str());
    }
}
