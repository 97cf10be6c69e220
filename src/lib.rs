//! Typed, namespaced, expiring key-value storage for sensitive values.
//!
//! sealcache layers a small cache over an opaque secure byte store (a
//! platform keychain, an encrypted file, or the bundled redb file). Each
//! value is wrapped in a JSON envelope with its write time and optional
//! expiry; expired entries are evicted lazily when they are next read.
//!
//! - [`store`] - envelope codec, backends, the [`ExpiringStore`] and statistics
//! - [`auth`] - auth/refresh token helpers with default lifetimes
//! - [`config`] / [`paths`] - CLI configuration
//!
//! # Example
//!
//! ```ignore
//! use sealcache::{AuthStore, ExpiringStore};
//!
//! let store = ExpiringStore::open("/var/lib/app/store.redb")?.with_namespace("app")?;
//! let auth = AuthStore::new(store.clone());
//!
//! auth.set_auth_token("tok", None).await?;
//! assert!(auth.is_authenticated().await);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod paths;
pub mod store;

pub use auth::{AuthLifetimes, AuthStore};
pub use error::{Error, Result};
pub use store::{ExpiringStore, ItemInfo, SecureBackend, StoreEvent, StoreStats, WellKnownKey};
