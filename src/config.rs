//! Configuration for the sealcache CLI.
//!
//! Loaded from `~/.sealcache/config.toml` (see [`crate::paths`]). Every
//! section is optional:
//!
//! ```toml
//! [store]
//! path = "~/.sealcache/store.redb"
//! namespace = "myapp"
//!
//! [auth]
//! token_lifetime_secs = 86400
//! refresh_lifetime_secs = 604800
//!
//! [log]
//! level = "warn"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{AuthLifetimes, DEFAULT_AUTH_TOKEN_LIFETIME, DEFAULT_REFRESH_TOKEN_LIFETIME};
use crate::store::validate_key;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store file; defaults to `~/.sealcache/store.redb`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: u64,
    #[serde(default = "default_refresh_lifetime_secs")]
    pub refresh_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_secs: default_token_lifetime_secs(),
            refresh_lifetime_secs: default_refresh_lifetime_secs(),
        }
    }
}

impl AuthConfig {
    /// Lifetimes for [`AuthStore`](crate::auth::AuthStore).
    pub fn lifetimes(&self) -> AuthLifetimes {
        AuthLifetimes {
            auth_token: Duration::from_secs(self.token_lifetime_secs),
            refresh_token: Duration::from_secs(self.refresh_lifetime_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_token_lifetime_secs() -> u64 {
    DEFAULT_AUTH_TOKEN_LIFETIME.as_secs()
}

fn default_refresh_lifetime_secs() -> u64 {
    DEFAULT_REFRESH_TOKEN_LIFETIME.as_secs()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// has unknown fields.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from `path` if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error listing every problem found:
    /// - Zero token lifetimes
    /// - Invalid namespace characters
    /// - Unknown log filter syntax
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.auth.token_lifetime_secs == 0 {
            errors.push("auth.token_lifetime_secs must be greater than 0".to_string());
        }
        if self.auth.refresh_lifetime_secs == 0 {
            errors.push("auth.refresh_lifetime_secs must be greater than 0".to_string());
        }
        if self.auth.refresh_lifetime_secs > 0
            && self.auth.refresh_lifetime_secs < self.auth.token_lifetime_secs
        {
            warnings.push(format!(
                "auth.refresh_lifetime_secs ({}) is shorter than auth.token_lifetime_secs ({})\n  \
                 The refresh token will expire before the auth token it renews",
                self.auth.refresh_lifetime_secs, self.auth.token_lifetime_secs
            ));
        }

        if let Some(ns) = &self.store.namespace
            && let Err(err) = validate_key(ns)
        {
            errors.push(format!("store.namespace: {err}"));
        }

        if let Err(err) = tracing_subscriber::EnvFilter::try_new(&self.log.level) {
            errors.push(format!("log.level '{}' is not a valid filter: {err}", self.log.level));
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.store.path.is_none());
        assert!(config.store.namespace.is_none());
        assert_eq!(config.auth.lifetimes(), AuthLifetimes::default());
        assert_eq!(config.log.level, "warn");
        assert!(!config.validate().unwrap().has_warnings());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[store]
path = "/var/lib/app/store.redb"
namespace = "myapp"

[auth]
token_lifetime_secs = 3600
refresh_lifetime_secs = 86400

[log]
level = "sealcache=debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.store.path.as_deref(),
            Some(Path::new("/var/lib/app/store.redb"))
        );
        assert_eq!(config.store.namespace.as_deref(), Some("myapp"));
        assert_eq!(
            config.auth.lifetimes().auth_token,
            Duration::from_secs(3600)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_auth_section_keeps_other_default() {
        let config: Config = toml::from_str("[auth]\ntoken_lifetime_secs = 60\n").unwrap();
        assert_eq!(config.auth.token_lifetime_secs, 60);
        assert_eq!(config.auth.refresh_lifetime_secs, 604_800);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[store]\nbogus = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_lifetimes() {
        let config: Config =
            toml::from_str("[auth]\ntoken_lifetime_secs = 0\nrefresh_lifetime_secs = 0\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("token_lifetime_secs must be greater than 0"));
        assert!(err.contains("refresh_lifetime_secs must be greater than 0"));
    }

    #[test]
    fn test_validate_short_refresh_warns() {
        let config: Config =
            toml::from_str("[auth]\ntoken_lifetime_secs = 100\nrefresh_lifetime_secs = 10\n")
                .unwrap();
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("shorter than"));
    }

    #[test]
    fn test_validate_bad_namespace() {
        let config: Config = toml::from_str("[store]\nnamespace = \"my app\"\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("store.namespace"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store\npath = ").unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
