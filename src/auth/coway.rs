// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coway OAuth login handshake.
//!
//! The identity provider only offers a browser flow, so the handshake
//! behaves like one: it loads the HTML login page, keeps the session
//! cookies, submits the embedded form, and reads the authorization code
//! from the redirect instead of following it. The code is then exchanged
//! for a token pair at the IoCare API.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, LOCATION, SET_COOKIE, USER_AGENT};
use scraper::{Html, Selector};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config::Endpoints;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::Envelope;
use crate::session::Credential;

use super::{HandshakeStep, form_body, no_redirect_client};

/// Browser identity presented to the login page.
const BROWSER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";

/// Fields the handshake always sets itself.
const SUBMITTED_FIELDS: [&str; 4] = ["username", "password", "rememberMe", "credentialId"];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

/// Login form scraped from the identity provider's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoginForm {
    pub(crate) action: Url,
    pub(crate) method: Method,
    pub(crate) hidden: Vec<(String, String)>,
}

/// Authorization code plus the redirect URL it was delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthCode {
    pub(crate) code: String,
    pub(crate) redirect_url: String,
}

/// Runs the Coway browser-emulating login.
pub struct CowayAuthenticator {
    username: String,
    password: SecretString,
    login_page: Url,
    token_url: Url,
    refresh_url: Url,
    /// Client used for the page and form steps; never follows redirects.
    browser: reqwest::Client,
}

impl CowayAuthenticator {
    /// Creates the authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid endpoints, or a communication
    /// error if the handshake client cannot be built.
    pub fn new(
        username: &str,
        password: SecretString,
        endpoints: &Endpoints,
        timeout: Duration,
    ) -> Result<Self> {
        let mut login_page = endpoints.coway_login_url()?;
        login_page
            .query_pairs_mut()
            .append_pair("client_id", &endpoints.coway_client_id)
            .append_pair("redirect_uri", &endpoints.coway_redirect)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid")
            .append_pair("ui_locales", "en");

        Ok(Self {
            username: username.to_string(),
            password,
            login_page,
            token_url: endpoints.coway("com/token")?,
            refresh_url: endpoints.coway("com/refresh-token")?,
            browser: no_redirect_client(timeout)?,
        })
    }

    /// Runs all handshake steps and returns the exchanged token pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] naming the failing [`HandshakeStep`], or
    /// [`Error::Communication`] if a request cannot be delivered.
    pub async fn login(&self, http: &reqwest::Client) -> Result<Credential> {
        // init-page
        tracing::debug!(step = %HandshakeStep::InitPage, url = %self.login_page, "loading login page");
        let response = self
            .browser
            .get(self.login_page.clone())
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(handshake(
                HandshakeStep::InitPage,
                format!("login page returned HTTP {status}"),
            ));
        }
        let page_url = response.url().clone();
        let cookies = collect_cookies(response.headers());
        let page = response.text().await?;

        // extract-form
        let form = extract_form(&page, &page_url)?;
        tracing::debug!(step = %HandshakeStep::ExtractForm, action = %form.action, method = %form.method, "login form found");

        // submit-login
        let mut fields: Vec<(&str, &str)> = form
            .hidden
            .iter()
            .filter(|(name, _)| !SUBMITTED_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        fields.extend([
            ("username", self.username.as_str()),
            ("password", self.password.expose_secret()),
            ("rememberMe", "on"),
            ("credentialId", ""),
        ]);

        let mut request = if form.method == Method::GET {
            let mut target = form.action.clone();
            target.query_pairs_mut().extend_pairs(&fields);
            self.browser.get(target)
        } else {
            self.browser
                .request(form.method.clone(), form.action.clone())
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form_body(&fields))
        };
        request = request.header(USER_AGENT, BROWSER_AGENT);
        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }
        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::FOUND {
            return Err(handshake(
                HandshakeStep::SubmitLogin,
                format!("expected HTTP 302, got HTTP {status} (wrong credentials?)"),
            ));
        }

        // extract-code
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| handshake(HandshakeStep::ExtractCode, "redirect without Location"))?;
        let code = extract_code(&form.action, location)?;
        tracing::debug!(step = %HandshakeStep::ExtractCode, redirect = %code.redirect_url, "authorization code received");

        // exchange-token
        self.exchange(http, &code).await
    }

    async fn exchange(&self, http: &reqwest::Client, code: &AuthCode) -> Result<Credential> {
        let response = http
            .post(self.token_url.clone())
            .json(&json!({
                "authCode": code.code,
                "redirectUrl": code.redirect_url,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(handshake(
                HandshakeStep::ExchangeToken,
                format!("token endpoint returned HTTP {status}: {body}"),
            ));
        }

        let envelope: Envelope<TokenPair> = serde_json::from_str(&body)
            .map_err(|e| handshake(HandshakeStep::ExchangeToken, e.to_string()))?;

        tracing::debug!(step = %HandshakeStep::ExchangeToken, "Coway login successful");
        Ok(Credential::exchanged(
            envelope.data.access_token,
            envelope.data.refresh_token,
        ))
    }

    /// Trades a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorizationExpired`] if the refresh token is
    /// rejected.
    pub async fn refresh(&self, http: &reqwest::Client, refresh_token: &str) -> Result<Credential> {
        tracing::debug!(url = %self.refresh_url, "refreshing access token");
        let response = http
            .post(self.refresh_url.clone())
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::AuthorizationExpired {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: Envelope<TokenPair> = serde_json::from_str(&body)
            .map_err(|e| ProtocolError::envelope("token refresh", &e))?;
        Ok(Credential::exchanged(
            envelope.data.access_token,
            envelope.data.refresh_token,
        ))
    }
}

impl std::fmt::Debug for CowayAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CowayAuthenticator")
            .field("username", &self.username)
            .field("login_page", &self.login_page.as_str())
            .finish_non_exhaustive()
    }
}

fn handshake(step: HandshakeStep, message: impl Into<String>) -> Error {
    ProtocolError::handshake(step, message).into()
}

/// Reduces `Set-Cookie` headers to a single `Cookie` header value.
fn collect_cookies(headers: &HeaderMap) -> Option<String> {
    let cookies: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if cookies.is_empty() {
        None
    } else {
        Some(cookies.join("; "))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|_| handshake(HandshakeStep::ExtractForm, format!("bad selector `{css}`")))
}

/// Finds the first form with an action and resolves it against the page.
///
/// The submit method comes from the form's `method` attribute, POST when
/// the attribute is missing or unparsable.
pub(crate) fn extract_form(page: &str, page_url: &Url) -> Result<LoginForm> {
    let document = Html::parse_document(page);
    let form_selector = selector("form[action]")?;
    let hidden_selector = selector("input[type=hidden][name]")?;

    let form = document
        .select(&form_selector)
        .next()
        .ok_or_else(|| handshake(HandshakeStep::ExtractForm, "no <form> with an action"))?;

    let raw_action = form.value().attr("action").unwrap_or_default();
    let action = page_url
        .join(raw_action)
        .map_err(|e| handshake(HandshakeStep::ExtractForm, format!("bad form action: {e}")))?;

    let method = form
        .value()
        .attr("method")
        .map(|raw| raw.trim().to_ascii_uppercase())
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| Method::from_bytes(raw.as_bytes()).ok())
        .unwrap_or(Method::POST);

    let hidden = form
        .select(&hidden_selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Ok(LoginForm {
        action,
        method,
        hidden,
    })
}

/// Reads the authorization code from a redirect `Location`.
pub(crate) fn extract_code(base: &Url, location: &str) -> Result<AuthCode> {
    let mut target = base
        .join(location)
        .map_err(|e| handshake(HandshakeStep::ExtractCode, format!("bad redirect: {e}")))?;

    let code = target
        .query_pairs()
        .find(|(name, _)| name == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| handshake(HandshakeStep::ExtractCode, "redirect carries no code"))?;

    target.set_query(None);
    target.set_fragment(None);

    Ok(AuthCode {
        code,
        redirect_url: target.to_string(),
    })
}
