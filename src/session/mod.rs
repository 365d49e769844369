// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account session: the credential store plus single-flight renewal.
//!
//! All pollers and command calls of one account share a [`Session`]. When
//! several of them discover an expired token at the same time, only the
//! first one to take the renewal lock runs the login handshake; the others
//! wait for it and then notice, through the store's generation counter, that
//! the token they were holding has already been replaced. If the handshake
//! fails instead, the waiters receive that failure rather than each starting
//! a login of their own.

mod credential;

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::auth::Authenticator;
use crate::config::RecoveryPolicy;
use crate::error::{Error, Result};

pub use credential::{Credential, CredentialStore};

/// Shared authentication state of one vendor account.
#[derive(Debug)]
pub struct Session {
    http: reqwest::Client,
    authenticator: Authenticator,
    recovery: RecoveryPolicy,
    store: CredentialStore,
    /// Held while a renewal runs. Guards the rendered error of the most
    /// recent failed attempt.
    renewal: Mutex<Option<String>>,
    /// Completed renewal attempts, successful or not.
    attempts: AtomicU64,
    logins: AtomicU64,
}

impl Session {
    /// Creates a session with an empty credential store.
    #[must_use]
    pub fn new(http: reqwest::Client, authenticator: Authenticator, recovery: RecoveryPolicy) -> Self {
        Self {
            http,
            authenticator,
            recovery,
            store: CredentialStore::new(),
            renewal: Mutex::new(None),
            attempts: AtomicU64::new(0),
            logins: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the current credential.
    #[must_use]
    pub fn credential(&self) -> Credential {
        self.store.get()
    }

    /// Returns the current credential together with its generation.
    #[must_use]
    pub fn current(&self) -> (Credential, u64) {
        self.store.current()
    }

    /// Installs a credential obtained elsewhere.
    pub fn replace(&self, credential: Credential) {
        self.store.replace(credential);
    }

    /// Returns how many full login handshakes this session has run.
    #[must_use]
    pub fn login_count(&self) -> u64 {
        self.logins.load(Ordering::Relaxed)
    }

    /// Logs in unless an access token is already held.
    ///
    /// # Errors
    ///
    /// Returns the authenticator's error if the login fails.
    pub async fn authenticate_if_needed(&self) -> Result<()> {
        let (credential, generation) = self.store.current();
        if credential.has_access_token() {
            return Ok(());
        }
        self.reauthenticate(generation).await
    }

    /// Renews the credential that was current at `observed_generation`.
    ///
    /// If another caller already renewed it while this one waited for the
    /// lock, returns immediately without contacting the vendor. If that
    /// caller's attempt failed, returns its failure without retrying. The new
    /// credential is only published once the whole handshake succeeded.
    ///
    /// # Errors
    ///
    /// Returns the authenticator's error if the login fails; the access
    /// token stays cleared in that case. Callers that waited on a failed
    /// attempt get [`Error::RenewalFailed`].
    pub async fn reauthenticate(&self, observed_generation: u64) -> Result<()> {
        let attempts_seen = self.attempts.load(Ordering::Acquire);
        let mut last_failure = self.renewal.lock().await;

        if self.store.generation() != observed_generation {
            tracing::debug!("credential already renewed by a concurrent request");
            return Ok(());
        }
        if self.attempts.load(Ordering::Acquire) != attempts_seen {
            let reason = last_failure.clone().unwrap_or_default();
            tracing::debug!(%reason, "concurrent re-authentication failed");
            return Err(Error::RenewalFailed(reason));
        }

        let previous = self.store.get();
        self.store.clear_access_token();

        let outcome = self.recover(&previous).await;
        self.attempts.fetch_add(1, Ordering::Release);
        match outcome {
            Ok(fresh) => {
                *last_failure = None;
                let generation = self.store.replace(fresh);
                tracing::debug!(generation, "credential renewed");
                Ok(())
            }
            Err(e) => {
                *last_failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn recover(&self, previous: &Credential) -> Result<Credential> {
        if self.recovery == RecoveryPolicy::RefreshFirst
            && let Some(refresh_token) = previous.refresh_token()
        {
            match self.authenticator.refresh(&self.http, refresh_token).await {
                Ok(credential) => {
                    tracing::debug!("access token refreshed");
                    return Ok(credential);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh failed, falling back to full login");
                }
            }
        }

        self.logins.fetch_add(1, Ordering::Relaxed);
        tracing::info!(vendor = %self.authenticator.vendor(), "logging in");
        self.authenticator.login(&self.http).await
    }
}
