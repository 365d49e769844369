// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! A [`BridgeConfig`] describes one vendor account: which backend to talk
//! to, the account credentials, and how often to poll. It can be built in
//! code or deserialized from the host's JSON configuration.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use cloudlink_lib::backend::Vendor;
//! use cloudlink_lib::config::{BridgeConfig, RecoveryPolicy};
//!
//! let config = BridgeConfig::new(Vendor::Coway, "me@example.com", "hunter2")
//!     .with_poll_interval(Duration::from_secs(30))
//!     .with_recovery(RecoveryPolicy::RefreshFirst);
//! assert!(config.validate().is_ok());
//!
//! let config: BridgeConfig = serde_json::from_str(
//!     r#"{ "vendor": "envi", "username": "me@example.com", "password": "pw", "pollInterval": 15 }"#,
//! ).unwrap();
//! assert_eq!(config.poll_interval(), Duration::from_secs(15));
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::backend::Vendor;
use crate::error::ConfigError;

/// How the session recovers when the vendor rejects the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryPolicy {
    /// Always run the full login again.
    #[default]
    FullLogin,
    /// Try the refresh token first and fall back to a full login when the
    /// vendor rejects it. Only the Coway backend issues refresh tokens.
    RefreshFirst,
}

/// Vendor endpoint locations.
///
/// Defaults point at the production hosts. Tests and proxies can point every
/// endpoint at one base URL with [`Endpoints::local`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    /// Envi API root; paths such as `auth/login` are joined onto it.
    pub envi_api: String,
    /// Coway identity provider authorization page.
    pub coway_login: String,
    /// Coway IoCare API root.
    pub coway_api: String,
    /// Redirect URI registered for the Coway client.
    pub coway_redirect: String,
    /// OAuth client id of the Coway mobile app.
    pub coway_client_id: String,
}

impl Endpoints {
    /// Envi production API root.
    pub const ENVI_API: &'static str = "https://app-apis.enviliving.com/apis/v1/";
    /// Coway production login page.
    pub const COWAY_LOGIN: &'static str =
        "https://id.coway.com/auth/realms/cw-account/protocol/openid-connect/auth";
    /// Coway production API root.
    pub const COWAY_API: &'static str = "https://iocareapi.iot.coway.com/api/v1/";
    /// Coway registered redirect URI.
    pub const COWAY_REDIRECT: &'static str =
        "https://iocare-redirect.iot.coway.com/redirect_bridge.html";
    /// Coway mobile client id.
    pub const COWAY_CLIENT_ID: &'static str = "cwid-prd-iocare-plus-25MJGcYX";

    /// Points every endpoint below a single base URL.
    ///
    /// `base` is typically a mock server address such as
    /// `http://127.0.0.1:4321`.
    #[must_use]
    pub fn local(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            envi_api: format!("{base}/envi/"),
            coway_login: format!("{base}/coway/auth"),
            coway_api: format!("{base}/coway/api/"),
            coway_redirect: format!("{base}/coway/redirect"),
            coway_client_id: Self::COWAY_CLIENT_ID.to_string(),
        }
    }

    /// Resolves a path below the Envi API root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the root or the path is invalid.
    pub fn envi(&self, path: &str) -> Result<Url, ConfigError> {
        join("envi_api", &self.envi_api, path)
    }

    /// Resolves a path below the Coway API root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the root or the path is invalid.
    pub fn coway(&self, path: &str) -> Result<Url, ConfigError> {
        join("coway_api", &self.coway_api, path)
    }

    /// Parses the Coway login page URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the URL is invalid.
    pub fn coway_login_url(&self) -> Result<Url, ConfigError> {
        parse("coway_login", &self.coway_login)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        parse("envi_api", &self.envi_api)?;
        parse("coway_api", &self.coway_api)?;
        parse("coway_redirect", &self.coway_redirect)?;
        self.coway_login_url()?;
        Ok(())
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            envi_api: Self::ENVI_API.to_string(),
            coway_login: Self::COWAY_LOGIN.to_string(),
            coway_api: Self::COWAY_API.to_string(),
            coway_redirect: Self::COWAY_REDIRECT.to_string(),
            coway_client_id: Self::COWAY_CLIENT_ID.to_string(),
        }
    }
}

fn parse(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })
}

/// Resolves `path` below `root`, treating `root` as a directory whether or
/// not it ends in `/`.
fn join(field: &'static str, root: &str, path: &str) -> Result<Url, ConfigError> {
    let mut root = parse(field, root)?;
    if !root.path().ends_with('/') {
        let directory = format!("{}/", root.path());
        root.set_path(&directory);
    }
    root.join(path).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })
}

/// Configuration for one vendor account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    vendor: Vendor,
    #[serde(default)]
    username: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    password: SecretString,
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "deserialize_secs"
    )]
    poll_interval: Duration,
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_secs"
    )]
    request_timeout: Duration,
    #[serde(default)]
    recovery: RecoveryPolicy,
    #[serde(default)]
    endpoints: Endpoints,
}

impl BridgeConfig {
    /// Default interval between two poll ticks of one device.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
    /// Default HTTP request timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a configuration for the given vendor account.
    #[must_use]
    pub fn new(vendor: Vendor, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            vendor,
            username: username.into(),
            password: SecretString::from(password.into()),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            recovery: RecoveryPolicy::default(),
            endpoints: Endpoints::default(),
        }
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the token recovery policy.
    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Overrides the vendor endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Returns the vendor backend.
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Returns the account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the account password.
    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the recovery policy.
    #[must_use]
    pub fn recovery(&self) -> RecoveryPolicy {
        self.recovery
    }

    /// Returns the vendor endpoints.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Checks that the configuration can be used to start a bridge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the username or password is
    /// empty, [`ConfigError::ZeroPollInterval`] for a zero interval, and
    /// [`ConfigError::InvalidUrl`] for an unparsable endpoint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::Missing("username"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(ConfigError::Missing("password"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        self.endpoints.validate()
    }
}

fn default_poll_interval() -> Duration {
    BridgeConfig::DEFAULT_POLL_INTERVAL
}

fn default_request_timeout() -> Duration {
    BridgeConfig::DEFAULT_REQUEST_TIMEOUT
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn deserialize_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}
