//! High-level expiring store over a [`SecureBackend`].
//!
//! Expiration is evaluated lazily: nothing runs in the background, and an
//! expired entry is physically removed the next time it is read through
//! [`ExpiringStore::get`], [`ExpiringStore::has`] or
//! [`ExpiringStore::clear_expired`].

use super::backend::SecureBackend;
use super::clock::{Clock, SystemClock};
use super::envelope::{self, EnvelopeMeta};
use super::keys::{MAX_KEY_LEN, validate_key};
use super::listeners::{Listeners, StoreEvent, Subscription};
use super::memory::MemoryBackend;
use super::redb::RedbBackend;
use crate::error::{Error, Result};
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// What a metadata read found under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Missing,
    Corrupt,
    Expired(EnvelopeMeta),
    Live(EnvelopeMeta),
}

/// Typed, namespaced, expiring key-value store.
///
/// Construct one at startup and hand clones to consumers; clones share the
/// backend, clock and listeners.
///
/// # Example
///
/// ```ignore
/// use sealcache::store::ExpiringStore;
/// use std::time::Duration;
///
/// let store = ExpiringStore::memory();
/// store.set("session_data", &serde_json::json!({"cart": 3}), Some(Duration::from_secs(3600))).await?;
///
/// let session: Option<serde_json::Value> = store.get("session_data").await?;
/// ```
#[derive(Clone)]
pub struct ExpiringStore {
    backend: Arc<dyn SecureBackend>,
    clock: Arc<dyn Clock>,
    namespace: Option<Arc<str>>,
    listeners: Arc<Listeners>,
}

impl ExpiringStore {
    /// Creates a store over the given backend using the system clock.
    pub fn new<B: SecureBackend>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Creates a store over a shared backend.
    pub fn from_arc(backend: Arc<dyn SecureBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            namespace: None,
            listeners: Arc::new(Listeners::default()),
        }
    }

    /// Creates a store backed by an in-memory map.
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Creates a store backed by a redb database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::new(RedbBackend::open(path)?))
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Stores every key as `"{namespace}.{key}"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the namespace is not a valid key.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        validate_key(&namespace)?;
        self.namespace = Some(namespace.into());
        Ok(self)
    }

    /// Namespace prefix, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Maps a caller key to the identifier handed to the backend.
    fn storage_key(&self, key: &str) -> Result<String> {
        validate_key(key)?;
        let Some(ns) = &self.namespace else {
            return Ok(key.to_string());
        };
        let full = format!("{ns}.{key}");
        if full.len() > MAX_KEY_LEN {
            return Err(Error::invalid_key(key, "key exceeds 256 bytes with namespace"));
        }
        Ok(full)
    }

    /// Registers a callback invoked after every persisted change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(callback))
    }

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// With `lifetime` the entry expires that long after now; without it the
    /// entry never expires.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKey`] / [`Error::InvalidLifetime`] for bad input
    /// - [`Error::Encode`] if the value cannot be serialized
    /// - [`Error::Persistence`] if the backend write fails
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        lifetime: Option<Duration>,
    ) -> Result<()> {
        let storage_key = self.storage_key(key)?;
        let bytes = envelope::encode(value, self.now_ms(), lifetime)?;

        self.backend
            .put(&storage_key, bytes)
            .await
            .map_err(|e| Error::persistence(key, "put", e))?;

        tracing::debug!(
            key = %key,
            backend = self.backend.name(),
            lifetime = ?lifetime,
            "Stored value"
        );
        self.listeners.notify(&StoreEvent::Set {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Reads the value under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent, expired (the entry is
    /// evicted), or holds bytes that do not decode as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for a bad key and
    /// [`Error::Persistence`] if the backend read fails.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let storage_key = self.storage_key(key)?;
        let Some(bytes) = self.read(key, &storage_key).await? else {
            return Ok(None);
        };

        let envelope = match envelope::decode::<serde_json::Value>(&bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Discarding unreadable entry");
                return Ok(None);
            },
        };

        if envelope.meta().is_expired_at(self.now_ms()) {
            self.evict(key, &storage_key).await;
            return Ok(None);
        }

        match serde_json::from_value(envelope.value) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Stored value has a different type");
                Ok(None)
            },
        }
    }

    /// Removes `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for a bad key and
    /// [`Error::Persistence`] if the backend delete fails.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let storage_key = self.storage_key(key)?;
        self.backend
            .delete(&storage_key)
            .await
            .map_err(|e| Error::persistence(key, "delete", e))?;

        tracing::debug!(key = %key, backend = self.backend.name(), "Removed value");
        self.listeners.notify(&StoreEvent::Removed {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Returns true iff [`get`](Self::get) would return a value.
    ///
    /// Evicts expired entries like `get`. Backend failures and invalid keys
    /// are logged and read as `false`.
    pub async fn has(&self, key: &str) -> bool {
        match self.probe(key).await {
            Ok(lookup) => matches!(lookup, Lookup::Live(_)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Existence check failed");
                false
            },
        }
    }

    /// Removes every key concurrently, continuing past failures.
    ///
    /// Returns the keys whose removal failed.
    pub async fn clear_all<I, K>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let results = join_all(keys.iter().map(|key| async move {
            let result = self.remove(key).await;
            (key, result)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(key, result)| match result {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Failed to clear key");
                    Some(key.clone())
                },
            })
            .collect()
    }

    /// Reads every key so expired entries are evicted.
    ///
    /// Returns how many probed keys held an expired entry. Eviction itself
    /// is best-effort: a failed removal is logged, not retried.
    pub async fn clear_expired<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let results = join_all(keys.iter().map(|key| self.probe(key))).await;

        let mut expired = 0;
        for (key, result) in keys.iter().zip(results) {
            match result {
                Ok(Lookup::Expired(_)) => expired += 1,
                Ok(_) => {},
                Err(err) => tracing::warn!(key = %key, error = %err, "Expiry probe failed"),
            }
        }
        if expired > 0 {
            tracing::debug!(expired, "Cleared expired entries");
        }
        expired
    }

    /// Metadata read with lazy eviction.
    async fn probe(&self, key: &str) -> Result<Lookup> {
        let storage_key = self.storage_key(key)?;
        let lookup = self.lookup_storage(key, &storage_key).await?;
        if matches!(lookup, Lookup::Expired(_)) {
            self.evict(key, &storage_key).await;
        }
        Ok(lookup)
    }

    /// Read-only metadata lookup. Never evicts.
    pub(crate) async fn lookup(&self, key: &str) -> Result<Lookup> {
        let storage_key = self.storage_key(key)?;
        self.lookup_storage(key, &storage_key).await
    }

    async fn lookup_storage(&self, key: &str, storage_key: &str) -> Result<Lookup> {
        let Some(bytes) = self.read(key, storage_key).await? else {
            return Ok(Lookup::Missing);
        };
        match envelope::decode_meta(&bytes) {
            Ok(meta) if meta.is_expired_at(self.now_ms()) => Ok(Lookup::Expired(meta)),
            Ok(meta) => Ok(Lookup::Live(meta)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Unreadable entry");
                Ok(Lookup::Corrupt)
            },
        }
    }

    /// Backend read. Empty bytes mean not found.
    async fn read(&self, key: &str, storage_key: &str) -> Result<Option<Vec<u8>>> {
        let bytes = self
            .backend
            .get(storage_key)
            .await
            .map_err(|e| Error::persistence(key, "get", e))?;
        Ok(bytes.filter(|b| !b.is_empty()))
    }

    async fn evict(&self, key: &str, storage_key: &str) {
        match self.backend.delete(storage_key).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Evicted expired entry");
                self.listeners.notify(&StoreEvent::Evicted {
                    key: key.to_string(),
                });
            },
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Failed to evict expired entry");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::ManualClock;

    #[tokio::test]
    async fn test_namespace_prefixes_storage_keys() {
        let backend = MemoryBackend::new();
        let store = ExpiringStore::new(backend.clone())
            .with_namespace("app")
            .unwrap();

        store.set("user_id", "u-1", None).await.unwrap();
        assert!(backend.contains_key("app.user_id"));
        assert!(!backend.contains_key("user_id"));

        let value: Option<String> = store.get("user_id").await.unwrap();
        assert_eq!(value.as_deref(), Some("u-1"));
        assert_eq!(store.namespace(), Some("app"));
    }

    #[tokio::test]
    async fn test_invalid_namespace_rejected() {
        assert!(matches!(
            ExpiringStore::memory().with_namespace("bad ns"),
            Err(Error::InvalidKey { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_key_rejected_everywhere() {
        let store = ExpiringStore::memory();

        assert!(matches!(
            store.set("bad key", "v", None).await,
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            store.get::<String>("").await,
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            store.remove("a/b").await,
            Err(Error::InvalidKey { .. })
        ));
        assert!(!store.has("bad key").await);
    }

    #[tokio::test]
    async fn test_zero_lifetime_rejected_without_write() {
        let backend = MemoryBackend::new();
        let store = ExpiringStore::new(backend.clone());

        let result = store.set("k", "v", Some(Duration::ZERO)).await;
        assert!(matches!(result, Err(Error::InvalidLifetime)));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_type_mismatch_reads_as_absent() {
        let store = ExpiringStore::memory();
        store.set("k", "text", None).await.unwrap();

        let value: Option<u32> = store.get("k").await.unwrap();
        assert_eq!(value, None);
        // Envelope itself is fine, so the key still counts as present.
        assert!(store.has("k").await);
    }

    #[tokio::test]
    async fn test_expired_type_mismatch_is_still_evicted() {
        let clock = ManualClock::new(0);
        let backend = MemoryBackend::new();
        let store = ExpiringStore::new(backend.clone()).with_clock(clock.clone());

        store
            .set("k", "text", Some(Duration::from_millis(5)))
            .await
            .unwrap();
        clock.advance(Duration::from_millis(10));

        let value: Option<u32> = store.get("k").await.unwrap();
        assert_eq!(value, None);
        assert!(!backend.contains_key("k"));
    }

    #[tokio::test]
    async fn test_lookup_does_not_evict() {
        let clock = ManualClock::new(0);
        let backend = MemoryBackend::new();
        let store = ExpiringStore::new(backend.clone()).with_clock(clock.clone());

        store
            .set("k", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        clock.advance(Duration::from_millis(10));

        assert!(matches!(store.lookup("k").await.unwrap(), Lookup::Expired(_)));
        assert!(backend.contains_key("k"));

        assert!(!store.has("k").await);
        assert!(!backend.contains_key("k"));
    }
}
