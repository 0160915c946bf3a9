//! Running statistics for a monitored endpoint.
//!
//! Statistics are folded one probe outcome at a time by the owning monitor
//! actor. The fold is a pure function: it never mutates its input and carries
//! no hidden state, which keeps the aggregation trivially testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probe::ProbeOutcome;

/// Last observed state of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl EndpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointStatus::Unknown => "unknown",
            EndpointStatus::Online => "online",
            EndpointStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative counters and running averages for one endpoint.
///
/// Invariants after any sequence of folds:
/// `total_pings == successful_pings + failed_pings` and
/// `uptime + downtime == total_pings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStats {
    pub total_pings: u64,
    pub successful_pings: u64,
    pub failed_pings: u64,

    /// Mean latency over successful probes only, rounded to whole milliseconds
    pub average_latency: u64,

    pub last_status: EndpointStatus,
    pub last_latency: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check: Option<DateTime<Utc>>,

    /// Number of probes that found the endpoint reachable
    pub uptime: u64,
    /// Number of probes that found the endpoint unreachable
    pub downtime: u64,

    /// Exact sum of successful latencies. Carrying the sum keeps the running
    /// average free of incremental rounding drift.
    #[serde(default)]
    pub latency_sum: u64,
}

impl MonitorStats {
    /// Fold one outcome into the statistics, producing the updated value.
    pub fn fold(&self, outcome: &ProbeOutcome) -> Self {
        let mut next = self.clone();

        next.total_pings += 1;
        next.last_check = Some(outcome.timestamp);
        next.last_latency = outcome.latency;

        if outcome.success {
            next.successful_pings += 1;
            next.uptime += 1;
            next.last_status = EndpointStatus::Online;
            next.latency_sum += outcome.latency;
            next.average_latency =
                (next.latency_sum + next.successful_pings / 2) / next.successful_pings;
        } else {
            next.failed_pings += 1;
            next.downtime += 1;
            next.last_status = EndpointStatus::Offline;
        }

        next
    }

    /// Rebuild the latency sum for stats restored from a store that predates
    /// the field. The reconstruction is approximate (the original rounding is
    /// lost) but keeps subsequent averages sane.
    pub fn normalize(&mut self) {
        if self.latency_sum == 0 && self.successful_pings > 0 {
            self.latency_sum = self.average_latency * self.successful_pings;
        }
    }
}
