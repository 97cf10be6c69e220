//! Path utilities for sealcache files.
//!
//! - [`get_home_dir`] - `~/.sealcache/` (base directory)
//! - [`get_config_path`] - `~/.sealcache/config.toml`
//! - [`get_store_path`] - `~/.sealcache/store.redb` (default store file)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "SEALCACHE_HOME";

/// Get the sealcache base directory.
///
/// Resolution order:
/// 1. `SEALCACHE_HOME` environment variable (if set)
/// 2. `~/.sealcache/` (default)
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".sealcache"))
}

/// Get the config file path: `~/.sealcache/config.toml`
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("config.toml"))
}

/// Get the default store path: `~/.sealcache/store.redb`
pub fn get_store_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("store.redb"))
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_home_env_override() {
        // SAFETY: tests touching the environment run serially.
        unsafe { std::env::set_var(HOME_ENV, "/tmp/sealcache-test-home") };
        assert_eq!(
            get_store_path().unwrap(),
            PathBuf::from("/tmp/sealcache-test-home/store.redb")
        );
        assert_eq!(
            get_config_path().unwrap(),
            PathBuf::from("/tmp/sealcache-test-home/config.toml")
        );
        unsafe { std::env::remove_var(HOME_ENV) };
    }

    #[test]
    #[serial]
    fn test_empty_env_falls_back_to_home() {
        // SAFETY: tests touching the environment run serially.
        unsafe { std::env::set_var(HOME_ENV, "") };
        let dir = get_home_dir().unwrap();
        assert!(dir.ends_with(".sealcache"));
        // SAFETY: tests touching the environment run serially.
        unsafe { std::env::remove_var(HOME_ENV) };
    }

    #[test]
    fn test_expand_tilde() {
        let plain = Path::new("/var/lib/store.redb");
        assert_eq!(expand_tilde(plain), plain);

        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_tilde(Path::new("~/.sealcache/store.redb")),
                home.join(".sealcache/store.redb")
            );
        }
    }
}
