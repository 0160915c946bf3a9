//! Snapshot store trait definition

use async_trait::async_trait;

use super::error::StorageResult;
use super::schema::PersistedState;

/// Trait for persistent snapshot stores.
///
/// Implementations persist the full monitoring state and restore it at
/// startup. The state fits in memory (history is capacity-bounded per
/// endpoint), so save and load operate on the whole state at once.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` as they are shared across async
/// tasks (the periodic save loop, API mutation handlers, and shutdown).
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved state.
    ///
    /// A store that has never been written to is a valid empty state, not an
    /// error. Errors are reserved for unreadable or corrupt stores.
    async fn load(&self) -> StorageResult<PersistedState>;

    /// Persist the full state, replacing whatever was saved before.
    async fn save(&self, state: &PersistedState) -> StorageResult<()>;
}
