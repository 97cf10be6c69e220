//! Envelope codec.
//!
//! Every value is persisted as a JSON envelope:
//!
//! ```text
//! { "value": <any JSON>, "timestamp": <ms epoch>, "expiresAt": <ms epoch, optional> }
//! ```
//!
//! A missing `expiresAt` means the entry never expires.

use crate::error::{Error, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The unit of persistence for every stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
    /// Write time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Instant after which the entry is invalid.
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl<T> Envelope<T> {
    /// Returns the metadata half of the envelope.
    pub fn meta(&self) -> EnvelopeMeta {
        EnvelopeMeta {
            timestamp: self.timestamp,
            expires_at: self.expires_at,
        }
    }
}

/// Envelope timestamps without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeMeta {
    pub timestamp: i64,
    pub expires_at: Option<i64>,
}

impl EnvelopeMeta {
    /// Returns true once `now_ms` has reached `expires_at`.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at.is_some_and(|exp| now_ms >= exp)
    }
}

/// Metadata view used by [`decode_meta`]. The payload must be present but
/// is skipped without being materialized.
#[derive(Deserialize)]
struct RawMeta {
    #[allow(dead_code)]
    value: IgnoredAny,
    timestamp: i64,
    #[serde(rename = "expiresAt", default)]
    expires_at: Option<i64>,
}

/// Serializes `value` into an envelope written at `now_ms`.
///
/// # Errors
///
/// Returns [`Error::InvalidLifetime`] for a zero lifetime and
/// [`Error::Encode`] if the value cannot be serialized.
pub fn encode<T: Serialize + ?Sized>(
    value: &T,
    now_ms: i64,
    lifetime: Option<Duration>,
) -> Result<Vec<u8>> {
    let expires_at = match lifetime {
        Some(l) if l.is_zero() => return Err(Error::InvalidLifetime),
        Some(l) => {
            let ms = i64::try_from(l.as_millis()).unwrap_or(i64::MAX).max(1);
            Some(now_ms.saturating_add(ms))
        },
        None => None,
    };

    let envelope = Envelope {
        value,
        timestamp: now_ms,
        expires_at,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Deserializes a full envelope.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not a valid envelope or the
/// payload does not match `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Envelope<T>> {
    serde_json::from_slice(bytes).map_err(Error::decode)
}

/// Deserializes only the envelope timestamps.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not a valid envelope.
pub fn decode_meta(bytes: &[u8]) -> Result<EnvelopeMeta> {
    let raw: RawMeta = serde_json::from_slice(bytes).map_err(Error::decode)?;
    Ok(EnvelopeMeta {
        timestamp: raw.timestamp,
        expires_at: raw.expires_at,
    })
}
