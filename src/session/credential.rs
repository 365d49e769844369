// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access credential and its in-memory store.

use std::fmt;

use parking_lot::RwLock;

/// Tokens issued to one account session.
///
/// No expiry is tracked; a token is considered valid until the vendor
/// rejects it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    refresh_token: Option<String>,
    issued_implicitly: bool,
}

impl Credential {
    /// A token returned directly by a login call, without a refresh token.
    #[must_use]
    pub fn implicit(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            issued_implicitly: true,
        }
    }

    /// A token pair obtained from an explicit exchange or refresh call.
    #[must_use]
    pub fn exchanged(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
            issued_implicitly: false,
        }
    }

    /// Returns the access token; empty when none is held.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token, if the backend issued one.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns `true` if the token came straight out of a login response.
    #[must_use]
    pub fn issued_implicitly(&self) -> bool {
        self.issued_implicitly
    }

    /// Returns `true` if an access token is held.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(redact))
            .field("issued_implicitly", &self.issued_implicitly)
            .finish()
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() { "<empty>" } else { "<redacted>" }
}

#[derive(Default)]
struct Versioned {
    credential: Credential,
    generation: u64,
}

/// Holder of the current credential.
///
/// Every [`replace`](Self::replace) bumps a generation counter that is read
/// together with the credential, so a caller can tell whether the token it
/// used has been renewed since.
#[derive(Default)]
pub struct CredentialStore {
    inner: RwLock<Versioned>,
}

impl CredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current credential.
    #[must_use]
    pub fn get(&self) -> Credential {
        self.inner.read().credential.clone()
    }

    /// Returns the current credential with its generation.
    #[must_use]
    pub fn current(&self) -> (Credential, u64) {
        let guard = self.inner.read();
        (guard.credential.clone(), guard.generation)
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Installs a new credential and returns the new generation.
    pub fn replace(&self, credential: Credential) -> u64 {
        let mut guard = self.inner.write();
        guard.credential = credential;
        guard.generation += 1;
        guard.generation
    }

    /// Drops the access token, keeping the refresh token.
    pub fn clear_access_token(&self) {
        self.inner.write().credential.access_token.clear();
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (credential, generation) = self.current();
        f.debug_struct("CredentialStore")
            .field("credential", &credential)
            .field("generation", &generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_credential_has_no_refresh_token() {
        let credential = Credential::implicit("abc");
        assert_eq!(credential.access_token(), "abc");
        assert!(credential.refresh_token().is_none());
        assert!(credential.issued_implicitly());
    }

    #[test]
    fn exchanged_credential_keeps_both_tokens() {
        let credential = Credential::exchanged("access", "refresh");
        assert_eq!(credential.refresh_token(), Some("refresh"));
        assert!(!credential.issued_implicitly());
    }

    #[test]
    fn debug_redacts_tokens() {
        let debug = format!("{:?}", Credential::exchanged("secret-a", "secret-r"));
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn replace_bumps_generation() {
        let store = CredentialStore::new();
        assert_eq!(store.generation(), 0);
        assert!(!store.get().has_access_token());

        assert_eq!(store.replace(Credential::implicit("one")), 1);
        assert_eq!(store.replace(Credential::implicit("two")), 2);

        let (credential, generation) = store.current();
        assert_eq!(credential.access_token(), "two");
        assert_eq!(generation, 2);
    }

    #[test]
    fn clear_keeps_refresh_token_and_generation() {
        let store = CredentialStore::new();
        store.replace(Credential::exchanged("access", "refresh"));
        store.clear_access_token();

        let (credential, generation) = store.current();
        assert!(!credential.has_access_token());
        assert_eq!(credential.refresh_token(), Some("refresh"));
        assert_eq!(generation, 1);
    }
}
