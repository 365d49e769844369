// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `CloudLink` Lib - bridge cloud-connected appliances to a canonical
//! device model.
//!
//! This library logs in to a vendor cloud, keeps a fresh state snapshot of
//! every device on the account, and forwards commands back to the cloud.
//! Expired credentials are renewed transparently.
//!
//! # Supported Vendors
//!
//! - **Envi**: wall heaters. Form login, Fahrenheit temperatures.
//! - **Coway**: air purifiers. Browser-style OAuth login with refresh tokens.
//!
//! # Architecture
//!
//! - [`auth`]: vendor login flows
//! - [`session`]: credential store and single-flight re-authentication
//! - [`protocol`]: authenticated request pipeline
//! - [`backend`]: vendor URL layouts and wire shapes
//! - [`manager`]: the [`Bridge`], its pollers and command dispatch
//! - [`state`], [`types`], [`command`]: the canonical model
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use cloudlink_lib::{Bridge, BridgeConfig, Intent, Vendor};
//!
//! #[tokio::main]
//! async fn main() -> cloudlink_lib::Result<()> {
//!     let config = BridgeConfig::new(Vendor::Envi, "me@example.com", "secret")
//!         .with_poll_interval(Duration::from_secs(15));
//!     let bridge = Bridge::new(config)?;
//!
//!     let devices = bridge.discover_devices().await?;
//!     for device in &devices {
//!         bridge.set_state(device.id(), Intent::TargetTemperature(21.0)).await?;
//!
//!         if let Some(snapshot) = bridge.snapshot(device.id()).await {
//!             println!("{}: {:?} °C", device.name(), snapshot.state().ambient_celsius());
//!         }
//!     }
//!
//!     bridge.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod session;
pub mod state;
pub mod types;

pub use backend::{DeviceIdentity, Vendor};
pub use command::Intent;
pub use config::{BridgeConfig, Endpoints, RecoveryPolicy};
pub use error::{CommunicationError, ConfigError, Error, ProtocolError, Result};
pub use event::{DeviceEvent, DeviceId};
pub use manager::Bridge;
pub use state::{DeviceState, Snapshot};
pub use types::{FanMode, PowerState, TemperatureUnit};
