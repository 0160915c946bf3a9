//! Endpoint registry - the identity → monitor mapping
//!
//! The registry is the single structure shared across all monitors. It
//! mediates create/delete/lookup/enumeration, owns the broadcast channel used
//! for snapshot fan-out, and is the seam the persistence gateway reads from
//! and rehydrates into.
//!
//! Mutating operations take the map's write lock, which serializes
//! create/delete racing on one identity; the lock is held only to mutate the
//! map itself, never across probe I/O, so monitors for different identities
//! proceed independently.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::actors::messages::{MonitorEvent, MonitorSnapshot};
use crate::actors::monitor::{EndpointSpec, MonitorHandle};
use crate::config::Config;
use crate::history::HistoryRange;
use crate::probe::ProbeOutcome;
use crate::storage::schema::{PersistedMonitor, PersistedState};

/// Capacity of the snapshot broadcast channel. Slow observers lag and
/// re-sync from a full snapshot instead of blocking monitors.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by registry operations.
///
/// Argument and lookup errors are returned synchronously and never change
/// registry or monitor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Rejected before any state change (bad host, port, or interval)
    InvalidArgument(String),

    /// Identity already present on create
    Duplicate(String),

    /// Operation on an unknown identity
    NotFound(String),

    /// Monitor actor unavailable (only observable during shutdown)
    Internal(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            RegistryError::Duplicate(id) => write!(f, "monitor already exists: {}", id),
            RegistryError::NotFound(id) => write!(f, "monitor not found: {}", id),
            RegistryError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

/// The identity → monitor mapping.
pub struct Registry {
    monitors: RwLock<HashMap<String, MonitorHandle>>,

    /// Broadcast sender shared by every monitor for snapshot fan-out
    event_tx: broadcast::Sender<MonitorEvent>,

    /// Probe timeout applied to monitors created from here on
    probe_timeout: Duration,

    /// History capacity applied to rings created from here on
    history_capacity: usize,
}

impl Registry {
    pub fn new(config: &Config) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            monitors: RwLock::new(HashMap::new()),
            event_tx,
            probe_timeout: config.ping_timeout(),
            history_capacity: config.max_history,
        }
    }

    /// Subscribe to snapshot change events.
    ///
    /// Subscribers receive events published after the subscription; callers
    /// wanting a full-state catch-up should pair this with [`Registry::list`]
    /// (subscribe first, then list, so no update falls in the gap).
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    fn validate(host: &str, port: u16, interval_ms: u64) -> RegistryResult<()> {
        if host.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "host must not be empty".to_string(),
            ));
        }
        if port == 0 {
            return Err(RegistryError::InvalidArgument(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if interval_ms == 0 {
            return Err(RegistryError::InvalidArgument(
                "interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a monitor for `host:port` and start probing immediately.
    pub async fn create(
        &self,
        host: &str,
        port: u16,
        interval_ms: u64,
    ) -> RegistryResult<MonitorSnapshot> {
        Self::validate(host, port, interval_ms)?;

        let spec = EndpointSpec::new(host, port, Duration::from_millis(interval_ms));
        let id = spec.identity();

        let mut monitors = self.monitors.write().await;
        if monitors.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }

        let handle = MonitorHandle::spawn(
            spec,
            self.probe_timeout,
            self.history_capacity,
            self.event_tx.clone(),
        );

        let snapshot = handle
            .start()
            .await
            .map_err(|e| RegistryError::Internal(e.to_string()))?;

        monitors.insert(id.clone(), handle);
        info!("created monitor {id}");

        Ok(snapshot)
    }

    /// Delete a monitor, stopping its loop and discarding its history.
    ///
    /// The monitor is stopped before this returns, so no probe for it can
    /// start afterwards.
    pub async fn delete(&self, id: &str) -> RegistryResult<()> {
        let handle = self
            .monitors
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        // stop first and wait for the ack: once it arrives the loop is
        // quiescent, then the shutdown tears the actor down
        let _ = handle.stop().await;
        handle.shutdown().await;

        info!("deleted monitor {id}");
        Ok(())
    }

    async fn lookup(&self, id: &str) -> RegistryResult<MonitorHandle> {
        self.monitors
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub async fn get(&self, id: &str) -> RegistryResult<MonitorSnapshot> {
        let handle = self.lookup(id).await?;
        handle
            .snapshot()
            .await
            .map_err(|e| RegistryError::Internal(e.to_string()))
    }

    /// Snapshot every monitor. Enumeration order carries no meaning.
    pub async fn list(&self) -> Vec<MonitorSnapshot> {
        let handles: Vec<MonitorHandle> = self.monitors.read().await.values().cloned().collect();

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.snapshot().await {
                Ok(snapshot) => snapshots.push(snapshot),
                // only hit while a monitor is being torn down concurrently
                Err(e) => debug!("skipping monitor during list: {e}"),
            }
        }

        snapshots
    }

    pub async fn start(&self, id: &str) -> RegistryResult<MonitorSnapshot> {
        let handle = self.lookup(id).await?;
        handle
            .start()
            .await
            .map_err(|e| RegistryError::Internal(e.to_string()))
    }

    pub async fn stop(&self, id: &str) -> RegistryResult<MonitorSnapshot> {
        let handle = self.lookup(id).await?;
        handle
            .stop()
            .await
            .map_err(|e| RegistryError::Internal(e.to_string()))
    }

    /// Change a monitor's interval. While running, its loop restarts with the
    /// new cadence; statistics and history persist.
    pub async fn reconfigure(&self, id: &str, interval_ms: u64) -> RegistryResult<MonitorSnapshot> {
        if interval_ms == 0 {
            return Err(RegistryError::InvalidArgument(
                "interval must be positive".to_string(),
            ));
        }

        let handle = self.lookup(id).await?;
        handle
            .update_interval(interval_ms)
            .await
            .map_err(|e| RegistryError::Internal(e.to_string()))
    }

    pub async fn history(
        &self,
        id: &str,
        range: Option<HistoryRange>,
        limit: Option<usize>,
    ) -> RegistryResult<Vec<ProbeOutcome>> {
        let handle = self.lookup(id).await?;
        handle
            .history(range, limit)
            .await
            .map_err(|e| RegistryError::Internal(e.to_string()))
    }

    /// Export the full state for the persistence gateway.
    pub async fn export(&self) -> PersistedState {
        let handles: Vec<MonitorHandle> = self.monitors.read().await.values().cloned().collect();

        let mut state = PersistedState::default();
        for handle in handles {
            let Ok(snapshot) = handle.snapshot().await else {
                continue;
            };
            let Ok(entries) = handle.history(None, None).await else {
                continue;
            };

            state.history.insert(snapshot.id.clone(), entries);
            state.monitors.push(PersistedMonitor::from_snapshot(&snapshot));
        }

        state
    }

    /// Rehydrate monitors from persisted state and auto-start each of them.
    ///
    /// Entries that fail validation (hand-edited files) are skipped with a
    /// warning rather than failing the whole restore.
    pub async fn restore(&self, state: PersistedState) {
        let PersistedState {
            monitors,
            mut history,
        } = state;

        let mut restored = 0;

        for persisted in monitors {
            if let Err(e) = Self::validate(&persisted.host, persisted.port, persisted.interval) {
                warn!("skipping persisted monitor {}: {e}", persisted.id);
                continue;
            }

            let spec = EndpointSpec::new(
                persisted.host,
                persisted.port,
                Duration::from_millis(persisted.interval),
            );
            let id = spec.identity();

            let mut monitors = self.monitors.write().await;
            if monitors.contains_key(&id) {
                warn!("skipping persisted monitor {id}: already present");
                continue;
            }

            let entries = history.remove(&id).unwrap_or_default();
            let handle = MonitorHandle::spawn_restored(
                spec,
                self.probe_timeout,
                self.history_capacity,
                self.event_tx.clone(),
                persisted.stats,
                entries,
            );

            let _ = handle.start().await;
            monitors.insert(id, handle);
            restored += 1;
        }

        if restored > 0 {
            info!("restored {restored} monitors from disk");
        }
    }

    /// Stop and tear down every monitor. Used on graceful shutdown after the
    /// final state save.
    pub async fn shutdown(&self) {
        let handles: Vec<MonitorHandle> = {
            let mut monitors = self.monitors.write().await;
            monitors.drain().map(|(_, handle)| handle).collect()
        };

        for handle in handles {
            let _ = handle.stop().await;
            handle.shutdown().await;
        }

        debug!("registry shut down");
    }
}

// ============================================================================
// Tests
// ============================================================================
