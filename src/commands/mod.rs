//! CLI command implementations for sealcache.
//!
//! - [`item`] - set/get/rm/has/info on a single key
//! - [`maintenance`] - stats and bulk clearing over the well-known keys
//! - [`auth`] - auth and refresh token helpers

pub mod auth;
pub mod item;
pub mod maintenance;

use anyhow::{Context as _, Result};
use sealcache::config::Config;
use sealcache::{AuthStore, ExpiringStore, paths};
use std::path::Path;
use std::time::Duration;

/// Store handles shared by every command.
pub struct Context {
    pub store: ExpiringStore,
    pub auth: AuthStore,
}

impl Context {
    /// Opens the store named by `store_override`, the config, or the
    /// default path, in that order.
    pub fn open(config: &Config, store_override: Option<&Path>) -> Result<Self> {
        let path = match (store_override, &config.store.path) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => paths::expand_tilde(path),
            (None, None) => paths::get_store_path()?,
        };

        let mut store = ExpiringStore::open(&path)
            .with_context(|| format!("Failed to open store: {}", path.display()))?;
        if let Some(ns) = &config.store.namespace {
            store = store.with_namespace(ns.clone())?;
        }
        tracing::debug!(
            path = %path.display(),
            namespace = store.namespace().unwrap_or(""),
            "Opened store"
        );

        let auth = AuthStore::with_lifetimes(store.clone(), config.auth.lifetimes());
        Ok(Self { store, auth })
    }
}

/// Converts a `--ttl` in seconds.
pub(crate) fn ttl(secs: Option<u64>) -> Option<Duration> {
    secs.map(Duration::from_secs)
}

/// Formats a millisecond timestamp for humans.
pub(crate) fn format_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map_or_else(|| format!("{ms} ms"), |t| t.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "1970-01-01T00:00:00+00:00");
        assert_eq!(format_ms(i64::MAX), format!("{} ms", i64::MAX));
    }

    #[test]
    fn test_context_uses_override_and_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let config: Config = toml::from_str("[store]\nnamespace = \"cli\"\n").unwrap();

        let ctx = Context::open(&config, Some(&dir.path().join("s.redb"))).unwrap();
        assert_eq!(ctx.store.namespace(), Some("cli"));
        assert!(dir.path().join("s.redb").exists());
    }
}
