//! Expiring key-value store over a secure byte primitive.
//!
//! Values are wrapped in a JSON envelope carrying their write time and an
//! optional expiry, then handed to a pluggable [`SecureBackend`]:
//!
//! - **RedbBackend**: Persistent storage with ACID guarantees (used by the CLI)
//! - **MemoryBackend**: Non-persistent storage (tests and embedding)
//!
//! Expired entries are evicted lazily on read. There is no background sweep.
//!
//! # Example
//!
//! ```ignore
//! use sealcache::store::ExpiringStore;
//! use std::time::Duration;
//!
//! let store = ExpiringStore::open("~/.sealcache/store.redb")?;
//! store.set("device_id", "dev-7", None).await?;
//! store.set("session_data", &session, Some(Duration::from_secs(900))).await?;
//!
//! let stats = store.stats().await?;
//! ```
//!
//! # Custom Backends
//!
//! Implement [`SecureBackend`] to layer the store on a platform keychain:
//!
//! ```ignore
//! struct KeychainBackend { /* ... */ }
//! impl SecureBackend for KeychainBackend { /* ... */ }
//!
//! let store = ExpiringStore::new(KeychainBackend::new());
//! ```

mod backend;
mod clock;
pub mod envelope;
mod expiring;
mod keys;
mod listeners;
mod memory;
mod redb;
mod stats;


pub use backend::SecureBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::{Envelope, EnvelopeMeta};
pub use expiring::ExpiringStore;
pub use keys::{MAX_KEY_LEN, WellKnownKey, validate_key};
pub use listeners::{StoreEvent, Subscription};
pub use memory::MemoryBackend;
pub use self::redb::RedbBackend;
pub use stats::{ItemInfo, StoreStats};
