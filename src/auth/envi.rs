// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Envi form login.

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::protocol::Envelope;
use crate::session::Credential;

use super::form_body;

/// Device id the iOS app sends with its login form.
const APP_DEVICE_ID: &str = "D46E2A18-EE5D-48FF-AFE8-AAAAAAAAAAAA";

#[derive(Deserialize)]
struct LoginData {
    token: String,
}

/// Logs in to the Envi cloud with a URL-encoded form.
pub struct EnviAuthenticator {
    username: String,
    password: SecretString,
    login_url: Url,
}

impl EnviAuthenticator {
    /// Creates the authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the Envi API root is not a valid URL.
    pub fn new(username: &str, password: SecretString, endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            username: username.to_string(),
            password,
            login_url: endpoints.envi("auth/login")?,
        })
    }

    /// Posts the login form and returns the issued token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the request fails, the status is
    /// not 2xx, or the reply is not a `{data:{token}}` envelope.
    pub async fn login(&self, http: &reqwest::Client) -> Result<Credential> {
        tracing::debug!(url = %self.login_url, "posting Envi login form");

        let body = form_body(&[
            ("username", &self.username),
            ("password", self.password.expose_secret()),
            ("login_type", "1"),
            ("device_type", "ios"),
            ("device_id", APP_DEVICE_ID),
        ]);

        let response = http
            .post(self.login_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("login request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "login rejected (HTTP {status}): {body}"
            )));
        }

        let envelope: Envelope<LoginData> = response
            .json()
            .await
            .map_err(|e| Error::Authentication(format!("malformed login response: {e}")))?;

        tracing::debug!("Envi login successful");
        Ok(Credential::implicit(envelope.data.token))
    }
}

impl std::fmt::Debug for EnviAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnviAuthenticator")
            .field("username", &self.username)
            .field("login_url", &self.login_url.as_str())
            .finish_non_exhaustive()
    }
}
