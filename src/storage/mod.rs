//! Snapshot persistence for registry and history state
//!
//! This module provides a trait-based abstraction for persisting the full
//! monitoring state (registry contents plus per-endpoint history) and
//! restoring it at startup.
//!
//! ## Design
//!
//! - **Trait-based**: `SnapshotStore` allows swapping implementations
//! - **Async**: All operations are async for compatibility with Tokio tasks
//! - **Batch-oriented**: Saves always write the full state; there is no
//!   incremental write path. The state is small (bounded history per
//!   endpoint), so a full rewrite is cheap and keeps the format trivial.
//!
//! Persistence is a side channel: save/load failures are logged at this
//! boundary and never reach the scheduling loops.

pub mod backend;
pub mod error;
pub mod json;
pub mod schema;

pub use backend::SnapshotStore;
pub use error::{StorageError, StorageResult};
pub use json::JsonStore;
pub use schema::{PersistedMonitor, PersistedState};

use tracing::warn;

/// Load persisted state, degrading to an empty state on failure.
///
/// A broken or unreadable store must not prevent startup: the process comes
/// up empty and starts persisting fresh state on the next save.
pub async fn load_or_empty(store: &dyn SnapshotStore) -> PersistedState {
    match store.load().await {
        Ok(state) => state,
        Err(e) => {
            warn!("failed to load persisted state, starting empty: {e}");
            PersistedState::default()
        }
    }
}
