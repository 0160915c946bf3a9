//! API shared state

use std::sync::Arc;

use tracing::warn;

use crate::registry::Registry;
use crate::storage::SnapshotStore;

/// Shared state passed to all API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// The endpoint registry; every monitor operation goes through it
    pub registry: Arc<Registry>,

    /// Snapshot store used for save-on-mutation persistence
    pub store: Arc<dyn SnapshotStore>,
}

impl ApiState {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn SnapshotStore>) -> Self {
        Self { registry, store }
    }

    /// Persist the current state after a mutation.
    ///
    /// Persistence failures are logged and swallowed; they never turn a
    /// successful registry operation into an API error, and the periodic
    /// save retries later.
    pub async fn persist(&self) {
        let state = self.registry.export().await;
        if let Err(e) = self.store.save(&state).await {
            warn!("failed to persist state: {e}");
        }
    }
}
