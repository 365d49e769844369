// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `CloudLink` library.
//!
//! Failures fall into a small taxonomy: the transport or the vendor rejected
//! a request ([`CommunicationError`]), the account could not be
//! authenticated or authorized, or a vendor response did not have the shape
//! the client expects ([`ProtocolError`]). Configuration problems are
//! reported separately through [`ConfigError`].

use thiserror::Error;

use crate::auth::HandshakeStep;
use crate::event::DeviceId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be delivered or the vendor answered with a
    /// non-success status that is not an authorization problem.
    #[error("communication failure: {0}")]
    Communication(#[from] CommunicationError),

    /// The simple-backend login was rejected or returned garbage.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The credential was rejected even after one re-authentication.
    #[error("authorization rejected after re-authentication")]
    Authorization,

    /// A concurrent request's re-authentication failed while this request
    /// was waiting for it. Carries the rendered failure.
    #[error("re-authentication failed in a concurrent request: {0}")]
    RenewalFailed(String),

    /// The refresh token was rejected; a full login is required.
    #[error("refresh token rejected (HTTP {status})")]
    AuthorizationExpired {
        /// Status code returned by the refresh endpoint.
        status: u16,
    },

    /// A vendor response deviated from the expected contract.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The bridge configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No device with this id is registered.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The device's backend has no way to express this command.
    #[error("{vendor} devices do not support {intent}")]
    UnsupportedIntent {
        /// Backend name.
        vendor: &'static str,
        /// Short description of the rejected command.
        intent: &'static str,
    },
}

/// Transport-level and HTTP-status failures.
#[derive(Debug, Error)]
pub enum CommunicationError {
    /// DNS, connection, TLS or timeout failure.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The vendor answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Request URL.
        url: String,
    },
}

/// The vendor response did not match the scraping or JSON contract.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A step of the login handshake could not be completed.
    #[error("login handshake failed at {step}: {message}")]
    Handshake {
        /// The step that failed.
        step: HandshakeStep,
        /// What went wrong.
        message: String,
    },

    /// A JSON envelope could not be decoded.
    #[error("malformed {context} response: {message}")]
    Envelope {
        /// Which call produced the response.
        context: &'static str,
        /// Decoder message.
        message: String,
    },
}

impl ProtocolError {
    /// Builds a handshake error for the given step.
    #[must_use]
    pub fn handshake(step: HandshakeStep, message: impl Into<String>) -> Self {
        Self::Handshake {
            step,
            message: message.into(),
        }
    }

    /// Builds an envelope error from a decoding failure.
    #[must_use]
    pub fn envelope(context: &'static str, err: &impl std::fmt::Display) -> Self {
        Self::Envelope {
            context,
            message: err.to_string(),
        }
    }

    /// Returns the handshake step, if this error came from the login handshake.
    #[must_use]
    pub fn step(&self) -> Option<HandshakeStep> {
        match self {
            Self::Handshake { step, .. } => Some(*step),
            Self::Envelope { .. } => None,
        }
    }
}

/// Errors raised while validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is empty.
    #[error("missing {0}")]
    Missing(&'static str),

    /// An endpoint could not be parsed as a URL.
    #[error("invalid {field} URL: {reason}")]
    InvalidUrl {
        /// The endpoint field.
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The poll interval must be positive.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Communication(CommunicationError::Transport(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_error_display_names_step() {
        let err = ProtocolError::handshake(HandshakeStep::ExtractForm, "no <form> element");
        assert_eq!(
            err.to_string(),
            "login handshake failed at extract-form: no <form> element"
        );
        assert_eq!(err.step(), Some(HandshakeStep::ExtractForm));
    }

    #[test]
    fn status_error_display() {
        let err = CommunicationError::Status {
            status: 503,
            url: "https://example.com/device/1".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://example.com/device/1");
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::Missing("username").into();
        assert!(matches!(err, Error::Config(ConfigError::Missing("username"))));
        assert_eq!(err.to_string(), "configuration error: missing username");
    }

    #[test]
    fn renewal_failure_names_the_shared_cause() {
        let err = Error::RenewalFailed("authentication failed: bad password".to_string());
        assert_eq!(
            err.to_string(),
            "re-authentication failed in a concurrent request: authentication failed: bad password"
        );
    }

    #[test]
    fn envelope_error_has_no_step() {
        let err = ProtocolError::Envelope {
            context: "device list",
            message: "missing field `data`".to_string(),
        };
        assert_eq!(err.step(), None);
    }
}
