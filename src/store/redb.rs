//! Redb-backed secure backend.
//!
//! Persistent byte storage with ACID guarantees. Encryption at rest is the
//! host's responsibility: place the database on protected storage.

use super::backend::SecureBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Table holding one envelope per key.
pub(crate) const ENVELOPES_TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("sealcache");

/// Redb-backed storage backend.
///
/// `RedbBackend` is `Clone` and can be shared across threads. Blocking
/// database calls run on the tokio blocking pool.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Opens or creates a redb database at the given path.
    ///
    /// Creates parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory cannot be created
    /// - Database file cannot be opened or created (permissions, disk full, etc.)
    /// - Initialization transaction fails to begin or commit
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {}", parent.display()))?;
        }

        let db = Database::create(path)
            .with_context(|| format!("Failed to open store database: {}", path.display()))?;

        // Create the table up front so reads on a fresh file succeed
        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        {
            let _table = write_txn
                .open_table(ENVELOPES_TABLE)
                .context("Failed to initialize envelopes table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get_sync(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;

        let table = read_txn
            .open_table(ENVELOPES_TABLE)
            .context("Failed to open envelopes table")?;

        let result = table
            .get(key)
            .with_context(|| format!("Failed to read key '{key}'"))?;

        Ok(result.map(|guard| guard.value().to_vec()))
    }

    fn put_sync(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        {
            let mut table = write_txn
                .open_table(ENVELOPES_TABLE)
                .context("Failed to open envelopes table")?;

            table
                .insert(key, bytes)
                .with_context(|| format!("Failed to insert key '{key}'"))?;
        }

        write_txn
            .commit()
            .context("Failed to commit put transaction")?;

        Ok(())
    }

    fn delete_sync(&self, key: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        {
            let mut table = write_txn
                .open_table(ENVELOPES_TABLE)
                .context("Failed to open envelopes table")?;

            table
                .remove(key)
                .with_context(|| format!("Failed to remove key '{key}'"))?;
        }

        write_txn
            .commit()
            .context("Failed to commit delete transaction")?;

        Ok(())
    }
}

#[async_trait]
impl SecureBackend for RedbBackend {
    fn name(&self) -> &'static str {
        "redb"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let backend = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || backend.put_sync(&key, &bytes))
            .await
            .context("Task join error")?
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let backend = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || backend.get_sync(&key))
            .await
            .context("Task join error")?
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let backend = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || backend.delete_sync(&key))
            .await
            .context("Task join error")?
    }
}
