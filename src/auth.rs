//! Authentication token helpers.
//!
//! Thin wrappers over [`ExpiringStore`] with fixed default lifetimes. Any
//! miss (absent, expired or unreadable) means "not authenticated"; callers
//! never see why.

use crate::error::{Error, Result};
use crate::store::{ExpiringStore, WellKnownKey};
use std::time::Duration;

/// Default auth token lifetime: 24 hours.
pub const DEFAULT_AUTH_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TOKEN_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Lifetimes applied when a token is stored without an explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthLifetimes {
    pub auth_token: Duration,
    pub refresh_token: Duration,
}

impl Default for AuthLifetimes {
    fn default() -> Self {
        Self {
            auth_token: DEFAULT_AUTH_TOKEN_LIFETIME,
            refresh_token: DEFAULT_REFRESH_TOKEN_LIFETIME,
        }
    }
}

/// Auth token storage built on an [`ExpiringStore`].
#[derive(Clone)]
pub struct AuthStore {
    store: ExpiringStore,
    lifetimes: AuthLifetimes,
}

impl AuthStore {
    /// Wraps `store` with the default lifetimes.
    pub fn new(store: ExpiringStore) -> Self {
        Self::with_lifetimes(store, AuthLifetimes::default())
    }

    pub fn with_lifetimes(store: ExpiringStore, lifetimes: AuthLifetimes) -> Self {
        Self { store, lifetimes }
    }

    /// The underlying store.
    pub fn store(&self) -> &ExpiringStore {
        &self.store
    }

    pub fn lifetimes(&self) -> AuthLifetimes {
        self.lifetimes
    }

    /// Stores the auth token, expiring after `lifetime` or the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn set_auth_token(&self, token: &str, lifetime: Option<Duration>) -> Result<()> {
        let lifetime = lifetime.unwrap_or(self.lifetimes.auth_token);
        self.store
            .set(WellKnownKey::AuthToken.as_str(), token, Some(lifetime))
            .await
    }

    /// Returns the auth token if present and not expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn auth_token(&self) -> Result<Option<String>> {
        self.store.get(WellKnownKey::AuthToken.as_str()).await
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn remove_auth_token(&self) -> Result<()> {
        self.store.remove(WellKnownKey::AuthToken.as_str()).await
    }

    /// Stores the refresh token, expiring after `lifetime` or the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn set_refresh_token(&self, token: &str, lifetime: Option<Duration>) -> Result<()> {
        let lifetime = lifetime.unwrap_or(self.lifetimes.refresh_token);
        self.store
            .set(WellKnownKey::RefreshToken.as_str(), token, Some(lifetime))
            .await
    }

    /// Returns the refresh token if present and not expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.store.get(WellKnownKey::RefreshToken.as_str()).await
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn remove_refresh_token(&self) -> Result<()> {
        self.store.remove(WellKnownKey::RefreshToken.as_str()).await
    }

    /// Removes the auth token, refresh token, user id and session data.
    ///
    /// All four removals are attempted concurrently even if some fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartialClear`] naming the keys that could not be
    /// removed.
    pub async fn clear_auth(&self) -> Result<()> {
        let failed = self.store.clear_all(WellKnownKey::AUTH).await;
        if failed.is_empty() {
            tracing::debug!("Cleared auth state");
            Ok(())
        } else {
            Err(Error::PartialClear { failed })
        }
    }

    /// Returns true iff an auth token is present and not expired.
    pub async fn is_authenticated(&self) -> bool {
        match self.auth_token().await {
            Ok(token) => token.is_some(),
            Err(err) => {
                tracing::warn!(error = %err, "Auth token lookup failed");
                false
            },
        }
    }
}
