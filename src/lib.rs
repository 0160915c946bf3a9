//! portwatch: TCP reachability and latency monitoring.
//!
//! Each monitored endpoint is owned by an independent actor task that probes
//! it on a configurable interval, folds every outcome into running statistics
//! and a bounded history ring, and publishes snapshot updates to a broadcast
//! channel. A registry maps endpoint identities to monitor handles, an axum
//! layer exposes the REST/WebSocket surface, and a JSON snapshot store
//! persists state across restarts.

pub mod actors;
pub mod api;
pub mod config;
pub mod history;
pub mod probe;
pub mod registry;
pub mod stats;
pub mod storage;
