//! Snapshot persistence tests
//!
//! These tests verify the save/restore cycle end to end:
//! - Export → save → load → restore keeps statistics and history
//! - Restored monitors auto-start
//! - Broken stores degrade to an empty state instead of failing startup

use std::time::Duration;

use portwatch::registry::Registry;
use portwatch::stats::MonitorStats;
use portwatch::storage::{
    JsonStore, PersistedMonitor, PersistedState, SnapshotStore, load_or_empty,
};

use super::helpers::*;

#[tokio::test]
async fn test_full_save_restore_cycle() {
    let (addr, target) = spawn_target().await;
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());

    let id = format!("127.0.0.1:{}", addr.port());

    // first process lifetime: probe for a while, then save and shut down
    let exported = {
        let registry = test_registry();
        registry
            .create("127.0.0.1", addr.port(), 20)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        let state = registry.export().await;
        store.save(&state).await.unwrap();
        registry.shutdown().await;
        state
    };

    let exported_monitor = &exported.monitors[0];
    assert!(exported_monitor.stats.total_pings >= 2);
    assert!(!exported.history[&id].is_empty());

    // second process lifetime: load and rehydrate
    let registry = test_registry();
    registry.restore(store.load().await.unwrap()).await;

    let snapshot = registry.get(&id).await.unwrap();

    assert!(snapshot.is_running, "restored monitor did not auto-start");
    assert!(
        snapshot.stats.total_pings >= exported_monitor.stats.total_pings,
        "restored stats went backwards"
    );

    let history = registry.history(&id, None, None).await.unwrap();
    assert!(history.len() >= exported.history[&id].len());
    // the restored ring still begins with the first persisted outcome
    assert_eq!(history[0].timestamp, exported.history[&id][0].timestamp);

    registry.shutdown().await;
    target.abort();
}

#[tokio::test]
async fn test_corrupt_store_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("monitors.json"), b"{ definitely not json")
        .await
        .unwrap();

    let store = JsonStore::new(dir.path());

    assert!(store.load().await.is_err());

    let state = load_or_empty(&store).await;
    assert!(state.monitors.is_empty());
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn test_restore_skips_invalid_entries() {
    let registry = test_registry();

    let state = PersistedState {
        monitors: vec![
            PersistedMonitor {
                id: "bad:0".to_string(),
                host: "bad".to_string(),
                port: 0,
                interval: 1000,
                stats: MonitorStats::default(),
            },
            PersistedMonitor {
                id: "good:80".to_string(),
                host: "good".to_string(),
                port: 80,
                interval: 1000,
                stats: MonitorStats::default(),
            },
        ],
        ..Default::default()
    };

    registry.restore(state).await;

    let monitors = registry.list().await;
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].id, "good:80");

    registry.shutdown().await;
}

#[tokio::test]
async fn test_restore_normalizes_legacy_stats() {
    // files written before the latency sum existed carry only the average
    let registry = test_registry();

    let legacy = MonitorStats {
        total_pings: 10,
        successful_pings: 10,
        uptime: 10,
        average_latency: 30,
        ..Default::default()
    };
    assert_eq!(legacy.latency_sum, 0);

    registry
        .restore(PersistedState {
            monitors: vec![PersistedMonitor {
                id: "legacy:81".to_string(),
                host: "legacy".to_string(),
                port: 81,
                interval: 60_000,
                stats: legacy,
            }],
            ..Default::default()
        })
        .await;

    let snapshot = registry.get("legacy:81").await.unwrap();
    assert_eq!(snapshot.stats.latency_sum, 300);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_history_is_capped_on_restore() {
    let config = {
        let mut config = test_config();
        config.max_history = 4;
        config
    };
    let registry = Registry::new(&config);

    let outcomes: Vec<_> = (0u64..10)
        .map(portwatch::probe::ProbeOutcome::success)
        .collect();

    let mut state = PersistedState {
        monitors: vec![PersistedMonitor {
            id: "a:80".to_string(),
            host: "a".to_string(),
            port: 80,
            interval: 60_000,
            stats: MonitorStats::default(),
        }],
        ..Default::default()
    };
    state.history.insert("a:80".to_string(), outcomes);

    registry.restore(state).await;

    let history = registry.history("a:80", None, None).await.unwrap();
    assert!(history.len() <= 4, "restore ignored the history cap");

    registry.shutdown().await;
}
