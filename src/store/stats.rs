//! Aggregate statistics and per-key introspection.
//!
//! Both operations evaluate expiry directly from envelope metadata and
//! never evict, so expired entries that nobody has read yet are still
//! reported as expired.

use super::expiring::{ExpiringStore, Lookup};
use super::keys::WellKnownKey;
use crate::error::Result;
use futures::future::join_all;
use serde::Serialize;

/// Counts over the well-known key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Keys with any bytes stored (valid, expired or unreadable).
    pub total_items: usize,
    pub valid_items: usize,
    pub expired_items: usize,
    /// Well-known keys observed to exist.
    pub keys: Vec<String>,
}

impl StoreStats {
    /// Entries that exist but could not be decoded.
    #[must_use]
    pub fn corrupt_items(&self) -> usize {
        self.total_items
            .saturating_sub(self.valid_items)
            .saturating_sub(self.expired_items)
    }
}

/// Envelope metadata for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    pub exists: bool,
    pub timestamp: i64,
    pub expires_at: Option<i64>,
    pub is_expired: bool,
}

impl ExpiringStore {
    /// Computes totals over [`WellKnownKey::ALL`].
    ///
    /// Costs one backend read per well-known key. Caller-defined keys are
    /// not counted since the backend cannot enumerate them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`](crate::Error::Persistence) if any
    /// backend read fails.
    pub async fn stats(&self) -> Result<StoreStats> {
        let lookups = join_all(WellKnownKey::ALL.iter().map(|k| self.lookup(k.as_str()))).await;

        let mut stats = StoreStats::default();
        for (key, lookup) in WellKnownKey::ALL.iter().zip(lookups) {
            match lookup? {
                Lookup::Missing => continue,
                Lookup::Live(_) => stats.valid_items += 1,
                Lookup::Expired(_) => stats.expired_items += 1,
                Lookup::Corrupt => {},
            }
            stats.total_items += 1;
            stats.keys.push(key.as_str().to_string());
        }

        tracing::debug!(
            total = stats.total_items,
            valid = stats.valid_items,
            expired = stats.expired_items,
            "Computed store stats"
        );
        Ok(stats)
    }

    /// Returns envelope metadata for `key` without reading the value and
    /// without evicting.
    ///
    /// Returns `Ok(None)` if the key is absent or its bytes are unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`](crate::Error::InvalidKey) for a bad
    /// key and [`Error::Persistence`](crate::Error::Persistence) if the
    /// backend read fails.
    pub async fn item_info(&self, key: &str) -> Result<Option<ItemInfo>> {
        let info = match self.lookup(key).await? {
            Lookup::Missing | Lookup::Corrupt => None,
            Lookup::Live(meta) => Some(ItemInfo {
                exists: true,
                timestamp: meta.timestamp,
                expires_at: meta.expires_at,
                is_expired: false,
            }),
            Lookup::Expired(meta) => Some(ItemInfo {
                exists: true,
                timestamp: meta.timestamp,
                expires_at: meta.expires_at,
                is_expired: true,
            }),
        };
        Ok(info)
    }
}
