//! End-to-end tests over the redb-backed store.
//!
//! These exercise the same paths the CLI uses: a store file on disk,
//! namespaces from config, and state surviving a reopen.

use sealcache::config::Config;
use sealcache::store::{ManualClock, RedbBackend, SecureBackend};
use sealcache::{AuthStore, ExpiringStore, WellKnownKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    scopes: Vec<String>,
}

fn session() -> Session {
    Session {
        user: "ada".to_string(),
        scopes: vec!["read".to_string(), "write".to_string()],
    }
}

#[tokio::test]
async fn test_values_and_expiry_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.redb");
    let clock = ManualClock::new(1_000_000);

    {
        let store = ExpiringStore::open(&path).unwrap().with_clock(clock.clone());
        store
            .set("session_data", &session(), Some(Duration::from_secs(60)))
            .await
            .unwrap();
        store.set("device_id", "dev-1", None).await.unwrap();
    }

    let store = ExpiringStore::open(&path).unwrap().with_clock(clock.clone());
    assert_eq!(
        store.get::<Session>("session_data").await.unwrap(),
        Some(session())
    );

    clock.advance(Duration::from_secs(61));
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.valid_items, 1);
    assert_eq!(stats.expired_items, 1);

    assert_eq!(store.clear_expired(WellKnownKey::ALL).await, 1);
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.keys, vec!["device_id"]);
}

#[tokio::test]
async fn test_wire_format_on_disk() {
    let tmp = TempDir::new().unwrap();
    let backend = RedbBackend::open(tmp.path().join("store.redb")).unwrap();
    let store = ExpiringStore::new(backend.clone()).with_clock(ManualClock::new(5_000));

    store
        .set("auth_token", "tok", Some(Duration::from_millis(250)))
        .await
        .unwrap();

    let raw = backend.get("auth_token").await.unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({ "value": "tok", "timestamp": 5_000, "expiresAt": 5_250 })
    );
}

#[tokio::test]
async fn test_corrupt_file_entry_is_a_miss() {
    let tmp = TempDir::new().unwrap();
    let backend = RedbBackend::open(tmp.path().join("store.redb")).unwrap();
    backend
        .put("user_preferences", b"\xff\xfe not an envelope".to_vec())
        .await
        .unwrap();

    let store = ExpiringStore::new(backend);
    assert_eq!(
        store
            .get::<serde_json::Value>("user_preferences")
            .await
            .unwrap(),
        None
    );
    assert!(!store.has("user_preferences").await);
    assert_eq!(store.stats().await.unwrap().corrupt_items(), 1);
}

#[tokio::test]
async fn test_namespaces_share_a_file_without_colliding() {
    let tmp = TempDir::new().unwrap();
    let base = ExpiringStore::open(tmp.path().join("store.redb")).unwrap();
    let alice = base.clone().with_namespace("alice").unwrap();
    let bob = base.with_namespace("bob").unwrap();

    AuthStore::new(alice.clone())
        .set_auth_token("alice-token", None)
        .await
        .unwrap();

    assert!(AuthStore::new(alice).is_authenticated().await);
    assert!(!AuthStore::new(bob).is_authenticated().await);
}

#[tokio::test]
async fn test_auth_lifetimes_from_config() {
    let tmp = TempDir::new().unwrap();
    let config: Config =
        toml::from_str("[auth]\ntoken_lifetime_secs = 30\nrefresh_lifetime_secs = 600\n")
            .unwrap();
    config.validate().unwrap();

    let clock = ManualClock::new(0);
    let store = ExpiringStore::open(tmp.path().join("store.redb"))
        .unwrap()
        .with_clock(clock.clone());
    let auth = AuthStore::with_lifetimes(store, config.auth.lifetimes());

    auth.set_auth_token("tok", None).await.unwrap();
    auth.set_refresh_token("ref", None).await.unwrap();

    clock.advance(Duration::from_secs(30));
    assert!(!auth.is_authenticated().await);
    assert_eq!(auth.refresh_token().await.unwrap().as_deref(), Some("ref"));

    auth.clear_auth().await.unwrap();
    assert_eq!(auth.refresh_token().await.unwrap(), None);
}

#[tokio::test]
async fn test_concurrent_writers_on_different_keys() {
    let tmp = TempDir::new().unwrap();
    let store = ExpiringStore::open(tmp.path().join("store.redb")).unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("item-{i}");
            store.set(&key, &i, None).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..16 {
        let key = format!("item-{i}");
        assert_eq!(store.get::<i32>(&key).await.unwrap(), Some(i));
    }
}
