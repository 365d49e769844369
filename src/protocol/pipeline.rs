// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request pipeline with bounded re-authentication.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{CommunicationError, Error, ProtocolError, Result};
use crate::session::Session;

use super::{ApiRequest, Envelope};

/// How many times one request may re-authenticate before giving up.
pub const MAX_REAUTH_RETRIES: u32 = 1;

/// Sends [`ApiRequest`]s on behalf of one account session.
///
/// Cloning is cheap; clones share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct Pipeline {
    http: reqwest::Client,
    session: Arc<Session>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

enum Outcome {
    Done(reqwest::Response),
    Unauthorized,
}

impl Pipeline {
    /// Creates a pipeline sending through `http` with `session`'s credential.
    #[must_use]
    pub fn new(http: reqwest::Client, session: Arc<Session>) -> Self {
        Self { http, session }
    }

    /// Returns the session this pipeline authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sends a request and returns the successful response.
    ///
    /// Logs in first if no access token is held. On 401, or on a 400 whose
    /// message starts with `Unauthenticated`, the session is renewed and the
    /// request is retried once.
    ///
    /// # Errors
    ///
    /// - [`Error::Communication`] for transport failures and non-2xx statuses
    /// - [`Error::Authorization`] if the retried request is still rejected
    /// - any login error raised while renewing the session, or
    ///   [`Error::RenewalFailed`] if a concurrent renewal this call waited on
    ///   failed
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        self.session.authenticate_if_needed().await?;

        let mut retries = 0;
        loop {
            let (credential, generation) = self.session.current();

            match self.attempt(request, credential.access_token()).await? {
                Outcome::Done(response) => return Ok(response),
                Outcome::Unauthorized if retries >= MAX_REAUTH_RETRIES => {
                    tracing::warn!(url = %request.url(), "request still unauthorized after re-authentication");
                    return Err(Error::Authorization);
                }
                Outcome::Unauthorized => {
                    retries += 1;
                    tracing::debug!(url = %request.url(), generation, "credential rejected, re-authenticating");
                    self.session.reauthenticate(generation).await?;
                }
            }
        }
    }

    /// Sends a request and decodes the `data` member of the JSON reply.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`Error::Protocol`] if the body is
    /// not an envelope around `T`. `context` names the call in that error.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        context: &'static str,
    ) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ProtocolError::envelope(context, &e))?;
        Ok(envelope.data)
    }

    async fn attempt(&self, request: &ApiRequest, token: &str) -> Result<Outcome> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url().clone());
        if !token.is_empty() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(Outcome::Done(response));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Outcome::Unauthorized);
        }
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if is_unauthenticated(&body) {
                return Ok(Outcome::Unauthorized);
            }
            tracing::debug!(url = %request.url(), body = %body, "bad request");
        }

        Err(CommunicationError::Status {
            status: status.as_u16(),
            url: request.url().to_string(),
        }
        .into())
    }
}

/// Recognizes the 400 body some expiry conditions are reported with.
fn is_unauthenticated(body: &str) -> bool {
    serde_json::from_str::<ErrorBody>(body)
        .is_ok_and(|error| error.message.starts_with("Unauthenticated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unauthenticated_message() {
        assert!(is_unauthenticated(r#"{"message":"Unauthenticated."}"#));
        assert!(is_unauthenticated(
            r#"{"status":"error","message":"Unauthenticated: token expired"}"#
        ));
    }

    #[test]
    fn other_bad_requests_are_not_auth_failures() {
        assert!(!is_unauthenticated(r#"{"message":"temperature out of range"}"#));
        assert!(!is_unauthenticated(r#"{"error":"Unauthenticated"}"#));
        assert!(!is_unauthenticated("Unauthenticated"));
        assert!(!is_unauthenticated(""));
    }
}
