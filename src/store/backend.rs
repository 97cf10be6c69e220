//! Backend trait for the secure byte store.
//!
//! Defines the minimal interface the expiring store needs from the host's
//! encrypted storage: atomic per-key put/get/delete over byte strings.
//! The primitive cannot enumerate its keys.

use anyhow::Result;
use async_trait::async_trait;

/// Secure primitive adapter.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// Implementations are expected to provide at least last-writer-wins
/// atomicity per key. Timeouts and retries, if any, belong here rather than
/// in the store.
///
/// # Example
///
/// ```ignore
/// use sealcache::store::{MemoryBackend, SecureBackend};
///
/// let backend = MemoryBackend::new();
/// backend.put("key", b"bytes".to_vec()).await?;
/// let bytes = backend.get("key").await?;
/// ```
#[async_trait]
pub trait SecureBackend: Send + Sync + 'static {
    /// Short backend name used in log fields.
    fn name(&self) -> &'static str;

    /// Stores `bytes` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Reads the bytes stored under `key`.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deletes `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn delete(&self, key: &str) -> Result<()>;
}
