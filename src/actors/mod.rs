//! Actor-based monitoring core
//!
//! Every monitored endpoint is owned by exactly one actor running as an
//! independent async task. Actors communicate via Tokio channels.
//!
//! ## Architecture Overview
//!
//! ```text
//!                  ┌─────────────────┐
//!                  │    Registry     │
//!                  └────────┬────────┘
//!                           │ spawns / commands (mpsc + oneshot)
//!            ┌──────────────┼──────────────┐
//!            │              │              │
//!    ┌───────▼───────┐      │      ┌───────▼───────┐
//!    │  Monitor-1    │      │      │  Monitor-N    │
//!    │ (host:port)   │      │      │ (host:port)   │
//!    └───────┬───────┘      │      └───────┬───────┘
//!            │  probe → fold → append      │
//!            └──────────────┼──────────────┘
//!                           │ publish snapshot
//!                ┌──────────▼──────────┐
//!                │  Broadcast Channel  │ (MonitorEvent)
//!                └──────────┬──────────┘
//!                           │ subscribe
//!              ┌────────────┴────────────┐
//!              │                         │
//!      ┌───────▼───────┐         ┌───────▼───────┐
//!      │ WebSocket #1  │   ...   │ WebSocket #M  │
//!      └───────────────┘         └───────────────┘
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: Each monitor has an mpsc command channel for control
//!    messages (start, stop, reconfigure, queries)
//! 2. **Events**: Monitors publish snapshot updates to a shared broadcast
//!    channel for fan-out to observers
//! 3. **Request/Response**: oneshot channels for synchronous queries
//!
//! Because a monitor's statistics and history are touched only from its own
//! task, queries answered between probes always observe a consistent
//! point-in-time view.

pub mod messages;
pub mod monitor;
