// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated request plumbing shared by every backend.
//!
//! Backends describe what to send as an [`ApiRequest`]; the [`Pipeline`]
//! attaches the session's bearer token, sends it, and recovers once from an
//! expired credential. Both vendors wrap their payloads in a
//! `{"data": ...}` [`Envelope`].

mod pipeline;

pub use pipeline::{MAX_REAUTH_RETRIES, Pipeline};

use reqwest::Method;
use serde::Deserialize;
use url::Url;

/// One vendor API call, independent of the credential it will carry.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    /// Creates a `PATCH` request with a JSON body.
    #[must_use]
    pub fn patch(url: Url, body: serde_json::Value) -> Self {
        Self {
            method: Method::PATCH,
            url,
            body: Some(body),
        }
    }

    /// Creates a `POST` request with a JSON body.
    #[must_use]
    pub fn post(url: Url, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url,
            body: Some(body),
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// The `{"data": ...}` wrapper around every vendor payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// The wrapped payload.
    pub data: T,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn patch_carries_body() {
        let url = Url::parse("https://api.example.com/device/1").unwrap();
        let request = ApiRequest::patch(url.clone(), json!({"state": 1}));
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url(), &url);
        assert_eq!(request.body(), Some(&json!({"state": 1})));
    }

    #[test]
    fn get_has_no_body() {
        let request = ApiRequest::get(Url::parse("https://api.example.com/device/list").unwrap());
        assert_eq!(request.method(), Method::GET);
        assert!(request.body().is_none());
    }

    #[test]
    fn envelope_ignores_siblings() {
        let envelope: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"status":"success","data":[1,2]}"#).unwrap();
        assert_eq!(envelope.data, vec![1, 2]);
    }
}
