//! MonitorActor - owns one endpoint's probe loop and state
//!
//! Each monitored endpoint gets its own actor. The actor alternates between
//! waiting (suspended on a cancellable deadline) and probing (bounded by the
//! probe timeout), folding every outcome into its statistics and history and
//! publishing the updated snapshot.
//!
//! ## Scheduling
//!
//! The loop is self-paced: the next probe is scheduled from the previous
//! probe's *completion* time plus the interval, never from wall-clock slots.
//! A probe that takes longer than the interval therefore delays the next one
//! instead of overlapping it. There is at most one probe in flight per
//! endpoint, and outcomes land in history strictly ordered by completion.
//!
//! ## Message Flow
//!
//! ```text
//! Deadline → TCP probe → fold stats → append history → publish MonitorEvent
//!     ↑
//!     └─── Commands (Start, Stop, UpdateInterval, queries, Shutdown)
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, instrument, trace, warn};

use crate::history::{HistoryRange, HistoryRing};
use crate::probe::{ProbeOutcome, Prober, TcpProber};
use crate::stats::MonitorStats;

use super::messages::{MonitorCommand, MonitorEvent, MonitorSnapshot};

/// Identity and scheduling parameters for one monitored endpoint.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    pub host: String,
    pub port: u16,
    pub interval: Duration,
}

impl EndpointSpec {
    pub fn new(host: impl Into<String>, port: u16, interval: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            interval,
        }
    }

    /// Stable identity, shared with the HTTP layer and persistence.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Actor that probes a single endpoint.
pub struct MonitorActor {
    /// Endpoint configuration; the interval is the only mutable part
    spec: EndpointSpec,

    /// Probe strategy (TCP connect in production, stubs in tests)
    prober: Arc<dyn Prober>,

    /// Whether the probe loop is active
    running: bool,

    /// Deadline of the next probe; meaningful only while running
    next_probe: Instant,

    stats: MonitorStats,
    history: HistoryRing,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<MonitorCommand>,

    /// Broadcast sender for publishing snapshot updates
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl MonitorActor {
    fn new(
        spec: EndpointSpec,
        prober: Arc<dyn Prober>,
        stats: MonitorStats,
        history: HistoryRing,
        command_rx: mpsc::Receiver<MonitorCommand>,
        event_tx: broadcast::Sender<MonitorEvent>,
    ) -> Self {
        Self {
            spec,
            prober,
            running: false,
            next_probe: Instant::now(),
            stats,
            history,
            command_rx,
            event_tx,
        }
    }

    /// Run the actor's main loop.
    ///
    /// This is the entry point for the actor. It runs until:
    /// - A Shutdown command is received
    /// - The command channel is closed
    #[instrument(skip(self), fields(endpoint = %self.spec.identity()))]
    pub async fn run(mut self) {
        debug!("starting monitor actor");

        loop {
            tokio::select! {
                // Deadline reached - probe the endpoint. The branch is armed
                // only while running, so a stopped monitor just sits on its
                // command channel.
                _ = sleep_until(self.next_probe), if self.running => {
                    self.cycle().await;
                    self.next_probe = Instant::now() + self.spec.interval;
                }

                // Handle commands; a pending wait is preempted immediately
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd) {
                                break;
                            }
                        }
                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("monitor actor stopped");
    }

    /// Perform one probe cycle: probe, fold, append, publish.
    async fn cycle(&mut self) {
        let outcome = self.prober.probe(&self.spec.host, self.spec.port).await;

        trace!(
            success = outcome.success,
            latency = outcome.latency,
            "probe completed"
        );

        self.stats = self.stats.fold(&outcome);
        self.history.append(outcome);
        self.publish();
    }

    /// Handle a command. Returns true when the actor should terminate.
    fn handle_command(&mut self, cmd: MonitorCommand) -> bool {
        match cmd {
            MonitorCommand::Start { respond_to } => {
                if !self.running {
                    debug!("starting probe loop");
                    self.running = true;
                    // first probe fires immediately
                    self.next_probe = Instant::now();
                }
                let _ = respond_to.send(self.snapshot());
            }

            MonitorCommand::Stop { respond_to } => {
                if self.running {
                    debug!("stopping probe loop");
                    self.running = false;
                }
                let _ = respond_to.send(self.snapshot());
            }

            MonitorCommand::UpdateInterval {
                interval_ms,
                respond_to,
            } => {
                debug!("updating interval to {interval_ms}ms");
                self.spec.interval = Duration::from_millis(interval_ms);
                if self.running {
                    // restart the cadence: one immediate probe, then the new
                    // interval from its completion
                    self.next_probe = Instant::now();
                }
                let _ = respond_to.send(self.snapshot());
            }

            MonitorCommand::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }

            MonitorCommand::GetHistory {
                range,
                limit,
                respond_to,
            } => {
                let _ = respond_to.send(self.history.snapshot(range, limit));
            }

            MonitorCommand::Shutdown => {
                debug!("received shutdown command");
                return true;
            }
        }

        false
    }

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            id: self.spec.identity(),
            host: self.spec.host.clone(),
            port: self.spec.port,
            interval: self.spec.interval.as_millis() as u64,
            is_running: self.running,
            stats: self.stats.clone(),
        }
    }

    fn publish(&self) {
        // send errors just mean nobody is subscribed right now
        match self.event_tx.send(MonitorEvent {
            snapshot: self.snapshot(),
        }) {
            Ok(receivers) => trace!("published snapshot to {receivers} receivers"),
            Err(_) => trace!("no receivers for snapshot event"),
        }
    }
}

/// Handle for controlling a MonitorActor.
///
/// The handle provides a typed API for sending commands to the actor. It can
/// be cloned and shared across tasks; all clones talk to the same actor.
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
    id: String,
}

impl MonitorHandle {
    /// Spawn a new monitor actor probing over TCP. The actor starts in the
    /// stopped state; call [`MonitorHandle::start`] to begin probing.
    pub fn spawn(
        spec: EndpointSpec,
        probe_timeout: Duration,
        history_capacity: usize,
        event_tx: broadcast::Sender<MonitorEvent>,
    ) -> Self {
        Self::spawn_inner(
            spec,
            Arc::new(TcpProber::new(probe_timeout)),
            MonitorStats::default(),
            HistoryRing::new(history_capacity),
            event_tx,
        )
    }

    /// Spawn a monitor actor rehydrated from persisted statistics and history.
    pub fn spawn_restored(
        spec: EndpointSpec,
        probe_timeout: Duration,
        history_capacity: usize,
        event_tx: broadcast::Sender<MonitorEvent>,
        mut stats: MonitorStats,
        history: Vec<ProbeOutcome>,
    ) -> Self {
        stats.normalize();
        Self::spawn_inner(
            spec,
            Arc::new(TcpProber::new(probe_timeout)),
            stats,
            HistoryRing::restore(history_capacity, history),
            event_tx,
        )
    }

    /// Spawn a monitor actor with a custom probe strategy (test seam).
    pub fn spawn_with_prober(
        spec: EndpointSpec,
        history_capacity: usize,
        event_tx: broadcast::Sender<MonitorEvent>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self::spawn_inner(
            spec,
            prober,
            MonitorStats::default(),
            HistoryRing::new(history_capacity),
            event_tx,
        )
    }

    fn spawn_inner(
        spec: EndpointSpec,
        prober: Arc<dyn Prober>,
        stats: MonitorStats,
        history: HistoryRing,
        event_tx: broadcast::Sender<MonitorEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let id = spec.identity();

        let actor = MonitorActor::new(spec, prober, stats, history, cmd_rx, event_tx);

        tokio::spawn(actor.run());

        Self { sender: cmd_tx, id }
    }

    /// Begin probing. Idempotent.
    pub async fn start(&self) -> Result<MonitorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::Start { respond_to: tx })
            .await
            .context("failed to send Start command")?;

        rx.await.context("monitor actor dropped the request")
    }

    /// Stop probing. Idempotent. When this returns, no further probe will
    /// start and no further event will be published for this monitor.
    pub async fn stop(&self) -> Result<MonitorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::Stop { respond_to: tx })
            .await
            .context("failed to send Stop command")?;

        rx.await.context("monitor actor dropped the request")
    }

    /// Change the scheduling interval. Statistics and history persist.
    pub async fn update_interval(&self, interval_ms: u64) -> Result<MonitorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::UpdateInterval {
                interval_ms,
                respond_to: tx,
            })
            .await
            .context("failed to send UpdateInterval command")?;

        rx.await.context("monitor actor dropped the request")
    }

    /// Query the current public snapshot.
    pub async fn snapshot(&self) -> Result<MonitorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::GetSnapshot { respond_to: tx })
            .await
            .context("failed to send GetSnapshot command")?;

        rx.await.context("monitor actor dropped the request")
    }

    /// Query retained probe outcomes, oldest first.
    pub async fn history(
        &self,
        range: Option<HistoryRange>,
        limit: Option<usize>,
    ) -> Result<Vec<ProbeOutcome>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::GetHistory {
                range,
                limit,
                respond_to: tx,
            })
            .await
            .context("failed to send GetHistory command")?;

        rx.await.context("monitor actor dropped the request")
    }

    /// Terminate the actor task.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(MonitorCommand::Shutdown).await;
    }

    /// Get the endpoint identity (host:port format).
    pub fn id(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// Tests
// ============================================================================
