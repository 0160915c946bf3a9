//! Message types for actor communication
//!
//! ## Design Principles
//!
//! 1. **Commands**: Request/response messages sent to a specific monitor via
//!    mpsc, answered over oneshot channels
//! 2. **Events**: Broadcast notifications published to all subscribers
//! 3. **Immutability**: Events are cloneable values; a snapshot handed out is
//!    never mutated afterwards

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::history::HistoryRange;
use crate::probe::ProbeOutcome;
use crate::stats::MonitorStats;

/// Externally visible state of a monitor at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    /// Stable identity (format: "host:port")
    pub id: String,

    pub host: String,
    pub port: u16,

    /// Scheduling interval in milliseconds
    pub interval: u64,

    pub is_running: bool,

    pub stats: MonitorStats,
}

/// Event published after every completed probe.
///
/// The broadcast channel may lag or drop messages for slow subscribers.
/// Acceptable, since observers can always re-sync from a full snapshot.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    pub snapshot: MonitorSnapshot,
}

/// Commands accepted by a monitor actor.
#[derive(Debug)]
pub enum MonitorCommand {
    /// Begin probing. A no-op (beyond the reply) if already running.
    Start {
        respond_to: oneshot::Sender<MonitorSnapshot>,
    },

    /// Stop probing. A no-op (beyond the reply) if already stopped. Once the
    /// reply arrives no further probe will start and no further event will be
    /// published for this monitor.
    Stop {
        respond_to: oneshot::Sender<MonitorSnapshot>,
    },

    /// Change the scheduling interval. While running, the loop restarts with
    /// the new cadence; statistics and history are untouched.
    UpdateInterval {
        interval_ms: u64,
        respond_to: oneshot::Sender<MonitorSnapshot>,
    },

    /// Query the current public snapshot.
    GetSnapshot {
        respond_to: oneshot::Sender<MonitorSnapshot>,
    },

    /// Query retained probe outcomes, oldest first.
    GetHistory {
        range: Option<HistoryRange>,
        limit: Option<usize>,
        respond_to: oneshot::Sender<Vec<ProbeOutcome>>,
    },

    /// Terminate the actor task, discarding statistics and history.
    Shutdown,
}
