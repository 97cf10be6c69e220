//! Well-known keys and key validation.
//!
//! The secure primitive cannot enumerate what it holds, so statistics and
//! the auth helpers work over this closed set. Arbitrary caller keys go
//! straight to the store and are invisible to [`ExpiringStore::stats`].
//!
//! [`ExpiringStore::stats`]: super::ExpiringStore::stats

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Maximum key length in bytes (namespace prefix included).
pub const MAX_KEY_LEN: usize = 256;

/// Fixed, enumerable key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownKey {
    AuthToken,
    RefreshToken,
    UserId,
    SessionData,
    UserPreferences,
    DeviceId,
}

impl WellKnownKey {
    /// Every well-known key, in reporting order.
    pub const ALL: [WellKnownKey; 6] = [
        Self::AuthToken,
        Self::RefreshToken,
        Self::UserId,
        Self::SessionData,
        Self::UserPreferences,
        Self::DeviceId,
    ];

    /// Keys removed when a user signs out.
    pub const AUTH: [WellKnownKey; 4] = [
        Self::AuthToken,
        Self::RefreshToken,
        Self::UserId,
        Self::SessionData,
    ];

    /// Storage identifier for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthToken => "auth_token",
            Self::RefreshToken => "refresh_token",
            Self::UserId => "user_id",
            Self::SessionData => "session_data",
            Self::UserPreferences => "user_preferences",
            Self::DeviceId => "device_id",
        }
    }
}

impl AsRef<str> for WellKnownKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WellKnownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellKnownKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown well-known key '{s}'"))
    }
}

/// Checks a caller key (or namespace) against the character set accepted
/// by platform secure stores: ASCII alphanumerics, `.`, `-`, `_`.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] if the key is empty, too long or contains
/// other characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_key(key, "key cannot be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(Error::invalid_key(key, "key exceeds 256 bytes"));
    }
    if !key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
    {
        return Err(Error::invalid_key(
            key,
            "only ASCII letters, digits, '.', '-' and '_' are allowed",
        ));
    }
    Ok(())
}
