//! TCP connect probing.
//!
//! A probe is a single TCP connection attempt against a `host:port` pair. The
//! connect future is raced against a fixed deadline, so exactly one of
//! connect, error, or timeout resolves the attempt and an outcome is never
//! counted twice.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Default connect timeout, applied per probe regardless of the endpoint's
/// scheduling interval.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// The immutable result of one probe attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    /// When the probe resolved
    pub timestamp: DateTime<Utc>,

    pub success: bool,

    /// Connect latency in milliseconds; 0 on failure
    pub latency: u64,

    /// Diagnostic message for failed probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn success(latency: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            success: true,
            latency,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            success: false,
            latency: 0,
            error: Some(error.into()),
        }
    }
}

/// Strategy for performing a single reachability probe.
///
/// The production implementation opens a TCP connection. Tests inject their
/// own probers to control timing and outcomes without real sockets.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str, port: u16) -> ProbeOutcome;
}

/// Probes by opening a TCP connection and timing the handshake.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, port: u16) -> ProbeOutcome {
        probe(host, port, self.timeout).await
    }
}

/// Perform one TCP connect attempt against `host:port`.
///
/// On a successful connect within `limit`, returns a success outcome carrying
/// the elapsed milliseconds. On a connect error or deadline expiry, returns a
/// failure outcome with a diagnostic message and latency 0. The connection is
/// closed immediately; only reachability and handshake latency are measured.
pub async fn probe(host: &str, port: u16, limit: Duration) -> ProbeOutcome {
    let start = std::time::Instant::now();

    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            let latency = start.elapsed().as_millis() as u64;
            drop(stream);
            trace!("{host}:{port}: connected in {latency}ms");
            ProbeOutcome::success(latency)
        }
        Ok(Err(e)) => {
            trace!("{host}:{port}: connect failed: {e}");
            ProbeOutcome::failure(e.to_string())
        }
        Err(_) => {
            trace!("{host}:{port}: connect timed out after {limit:?}");
            ProbeOutcome::failure("connect timed out")
        }
    }
}
