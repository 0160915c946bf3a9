//! Persisted state shapes
//!
//! These types define the on-disk JSON layout. Monitors and history are kept
//! in separate collections, and in separate files in the JSON store.
//!
//! `is_running` is not persisted: restored monitors always auto-start, so a
//! restart resumes monitoring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actors::messages::MonitorSnapshot;
use crate::probe::ProbeOutcome;
use crate::stats::MonitorStats;

/// One monitor as written to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMonitor {
    /// Endpoint identity (format: "host:port")
    pub id: String,

    pub host: String,
    pub port: u16,

    /// Scheduling interval in milliseconds
    pub interval: u64,

    #[serde(default)]
    pub stats: MonitorStats,
}

impl PersistedMonitor {
    pub fn from_snapshot(snapshot: &MonitorSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            host: snapshot.host.clone(),
            port: snapshot.port,
            interval: snapshot.interval,
            stats: snapshot.stats.clone(),
        }
    }
}

/// The full persisted state: every monitor plus its retained history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    pub monitors: Vec<PersistedMonitor>,

    /// Endpoint identity → outcomes, oldest first
    pub history: HashMap<String, Vec<ProbeOutcome>>,
}
