// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor login flows.
//!
//! - [`EnviAuthenticator`]: one form POST, token in the JSON reply.
//! - [`CowayAuthenticator`]: browser-emulating OAuth handshake against the
//!   Coway identity provider, see [`HandshakeStep`].
//!
//! Authenticators only produce a [`Credential`]; storing it is the
//! [`Session`](crate::session::Session)'s job.

mod coway;
mod envi;

use std::fmt;
use std::time::Duration;

use crate::backend::Vendor;
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::session::Credential;

pub use coway::CowayAuthenticator;
pub use envi::EnviAuthenticator;

/// Named steps of the Coway login handshake, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeStep {
    /// Fetch the HTML login page and its session cookies.
    InitPage,
    /// Locate the login form and its action URL.
    ExtractForm,
    /// Post the account credentials to the form action.
    SubmitLogin,
    /// Read the authorization code from the redirect.
    ExtractCode,
    /// Trade the authorization code for a token pair.
    ExchangeToken,
}

impl HandshakeStep {
    /// Returns the step name used in logs and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InitPage => "init-page",
            Self::ExtractForm => "extract-form",
            Self::SubmitLogin => "submit-login",
            Self::ExtractCode => "extract-code",
            Self::ExchangeToken => "exchange-token",
        }
    }
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login flow of the configured vendor.
#[derive(Debug)]
pub enum Authenticator {
    /// Envi form login.
    Envi(EnviAuthenticator),
    /// Coway OAuth handshake.
    Coway(CowayAuthenticator),
}

impl Authenticator {
    /// Builds the authenticator for a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or the handshake's
    /// HTTP client cannot be built.
    pub fn for_config(config: &BridgeConfig) -> Result<Self> {
        match config.vendor() {
            Vendor::Envi => Ok(Self::Envi(EnviAuthenticator::new(
                config.username(),
                config.password().clone(),
                config.endpoints(),
            )?)),
            Vendor::Coway => Ok(Self::Coway(CowayAuthenticator::new(
                config.username(),
                config.password().clone(),
                config.endpoints(),
                config.request_timeout(),
            )?)),
        }
    }

    /// Returns the vendor this authenticator logs in to.
    #[must_use]
    pub fn vendor(&self) -> Vendor {
        match self {
            Self::Envi(_) => Vendor::Envi,
            Self::Coway(_) => Vendor::Coway,
        }
    }

    /// Runs the full login.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] for Envi login failures and
    /// [`Error::Protocol`] tagged with the failing [`HandshakeStep`] for
    /// Coway; transport failures surface as [`Error::Communication`].
    pub async fn login(&self, http: &reqwest::Client) -> Result<Credential> {
        match self {
            Self::Envi(auth) => auth.login(http).await,
            Self::Coway(auth) => auth.login(http).await,
        }
    }

    /// Trades a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorizationExpired`] when the vendor rejects the
    /// refresh token. Envi never issues refresh tokens and always fails.
    pub async fn refresh(&self, http: &reqwest::Client, refresh_token: &str) -> Result<Credential> {
        match self {
            Self::Envi(_) => Err(Error::Authentication(
                "envi sessions cannot be refreshed".to_string(),
            )),
            Self::Coway(auth) => auth.refresh(http, refresh_token).await,
        }
    }
}

/// Encodes `application/x-www-form-urlencoded` fields.
pub(crate) fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds an HTTP client that does not follow redirects.
pub(crate) fn no_redirect_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_encodes_values() {
        let body = form_body(&[("username", "a+b@example.com"), ("password", "p&ss w")]);
        assert_eq!(body, "username=a%2Bb%40example.com&password=p%26ss%20w");
    }

    #[test]
    fn step_names() {
        assert_eq!(HandshakeStep::InitPage.to_string(), "init-page");
        assert_eq!(HandshakeStep::ExchangeToken.as_str(), "exchange-token");
    }

    #[test]
    fn authenticator_matches_vendor() {
        let config = BridgeConfig::new(Vendor::Coway, "user", "pass");
        let auth = Authenticator::for_config(&config).unwrap();
        assert_eq!(auth.vendor(), Vendor::Coway);

        let config = BridgeConfig::new(Vendor::Envi, "user", "pass");
        let auth = Authenticator::for_config(&config).unwrap();
        assert_eq!(auth.vendor(), Vendor::Envi);
    }
}
